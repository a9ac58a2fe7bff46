//! Terminal rendering for sessions, ledger entries, statistics and receipts

use colored::*;
use instatip_scorer::ContentAnalysis;
use instatip_types::{
    Amount, InstaTipError, LedgerEntry, Session, SessionStatus, SettlementReceipt, Statistics,
};

const RULE_WIDTH: usize = 56;

/// Print a titled block separator
pub fn heading(title: &str) {
    println!();
    println!("{} {}", "▌".bright_magenta(), title.to_uppercase().bold());
    println!("{}", "─".repeat(RULE_WIDTH).bright_black());
}

fn status_line(mark: ColoredString, message: &str) {
    println!("  {mark} {message}");
}

pub fn done(message: &str) {
    status_line("✓".bright_green(), message);
}

pub fn note(message: &str) {
    status_line("·".bright_blue(), message);
}

pub fn caution(message: &str) {
    status_line("!".yellow().bold(), &message.yellow().to_string());
}

/// Print a refused operation with its stable error code
pub fn refused(err: &InstaTipError) {
    status_line(
        "✗".bright_red(),
        &format!("{} {}", format!("[{}]", err.error_code()).red(), err),
    );
}

fn field(key: &str, value: impl std::fmt::Display) {
    println!("    {:<12} {}", format!("{key}:").bright_black(), value);
}

fn money(amount: Amount, token: &str) -> ColoredString {
    format!("{amount} {token}").bright_cyan()
}

fn status_label(status: SessionStatus) -> ColoredString {
    match status {
        SessionStatus::Active => "active".green(),
        SessionStatus::Ended => "ended".yellow(),
        SessionStatus::Settled => "settled".bright_blue(),
    }
}

/// Allowance, spending and lifecycle of a session
pub fn session(session: &Session, token: &str) {
    field("Session", session.id());
    field("Owner", session.owner());
    field("Status", status_label(session.status()));
    field(
        "Spent",
        format!(
            "{} of {}",
            money(session.spent(), token),
            money(session.allowance(), token)
        ),
    );
    field("Remaining", money(session.remaining(), token));
    field("Transfers", session.transaction_count());
    if session.ended_at().is_some() {
        field("Duration", format!("{} min", session.duration_minutes()));
    }
}

/// Tip totals and the recipient ranking
pub fn stats(stats: &Statistics, token: &str) {
    field("Tips", stats.total_tips);
    field("Total", money(stats.total_amount, token));
    field("Average", money(stats.average_tip.round_dp(4), token));
    for (rank, recipient) in stats.top_recipients.iter().enumerate() {
        println!(
            "    #{} {:<14} {} in {} tip(s)",
            rank + 1,
            recipient.address.bright_white(),
            money(recipient.amount, token),
            recipient.count
        );
    }
}

pub fn receipt(receipt: &SettlementReceipt, token: &str) {
    field("Reference", receipt.settlement_ref.as_str().bright_white());
    field("Entries", receipt.settled_entries);
    field("Amount", money(receipt.settled_amount, token));
    field("Settled at", receipt.settled_at.format("%Y-%m-%d %H:%M:%S UTC"));
}

/// One ledger line: kind, recipient, amount, settlement mark
pub fn entry(entry: &LedgerEntry, token: &str) {
    let kind = match entry {
        LedgerEntry::Tip(_) => "tip".magenta(),
        LedgerEntry::Transaction(_) => "tx ".blue(),
    };
    let mark = if entry.is_settled() {
        "settled".green()
    } else {
        "open".red()
    };
    println!(
        "    {} {:<10} {:>10} {}",
        kind,
        entry.recipient(),
        money(entry.amount(), token),
        mark
    );
}

/// Score, suggested tip and contributing factors
pub fn analysis(analysis: &ContentAnalysis, token: &str) {
    field(
        "Score",
        format!("{:.1}/10", analysis.score).bright_yellow().bold(),
    );
    field("Suggested", money(analysis.suggested_tip, token));
    if analysis.factors.is_empty() {
        field("Factors", "none".bright_black());
    } else {
        field("Factors", analysis.factors.join(", "));
    }
}
