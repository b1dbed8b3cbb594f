//! Plain-text rendering of a recommendation for terminal output.

use std::fmt;

use optionlab_core::domain::{TradeStructure, CONTRACT_MULTIPLIER};

use crate::orchestrator::Recommendation;

const RULE: &str = "======================================================================";

/// Human-readable summary: strategy, trade, market, risk, alternatives.
pub fn render(rec: &Recommendation) -> String {
    Report(rec).to_string()
}

/// [`Display`](fmt::Display) adapter behind [`render`], for writing straight
/// into a formatter.
pub struct Report<'a>(pub &'a Recommendation);

impl fmt::Display for Report<'_> {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_report(out, self.0)
    }
}

fn write_report(out: &mut fmt::Formatter<'_>, rec: &Recommendation) -> fmt::Result {
    let t = &rec.trade;
    writeln!(out, "{RULE}")?;
    writeln!(out, "OPTIONS TRADE RECOMMENDATION  {} {}", rec.symbol, rec.as_of)?;
    writeln!(out, "{RULE}")?;
    writeln!(out, "Strategy:    {}", rec.label)?;
    writeln!(out, "Confidence:  {:.1}%", rec.confidence * 100.0)?;
    if let Some(from) = rec.fallback_from {
        writeln!(out, "Fallback:    {from} could not be built on this chain")?;
    }
    if let Some(rule_label) = rec.rule_label {
        let verdict = if rec.agrees_with_rules == Some(true) { "agrees" } else { "differs" };
        writeln!(out, "Rule engine: {rule_label} ({verdict})")?;
    }
    writeln!(out, "Id:          {}", rec.id.short())?;

    writeln!(out, "\nTrade")?;
    match &t.structure {
        TradeStructure::Calendar { near_dte, far_dte, .. }
        | TradeStructure::Diagonal { near_dte, far_dte, .. } => {
            writeln!(out, "  DTE:          {near_dte} / {far_dte} days")?
        }
        _ => writeln!(out, "  DTE:          {} days", t.nearest_dte())?,
    }
    for leg in &t.legs {
        writeln!(
            out,
            "  {:?} {} x{} {} @ {:.2} ({} DTE)",
            leg.action, leg.option_type, leg.contracts, leg.strike, leg.price, leg.dte
        )?;
    }
    writeln!(out, "  Contracts:    {}", t.contracts)?;
    writeln!(
        out,
        "  Net {:?}:    ${:.2} (${:.2}/share)",
        t.cash_flow,
        t.total_premium,
        t.premium_per_contract / CONTRACT_MULTIPLIER
    )?;
    writeln!(out, "  Max loss:     ${:.2}", t.max_loss)?;
    writeln!(out, "  Max profit:   {}", t.max_profit)?;
    if !t.breakevens.is_empty() {
        let be: Vec<String> = t.breakevens.iter().map(|b| format!("${b:.2}")).collect();
        writeln!(out, "  Breakeven:    {}", be.join(" / "))?;
    }
    if let Some(rr) = t.risk_reward_ratio {
        writeln!(out, "  Reward/risk:  {rr:.2}")?;
    }
    if let Some(note) = &t.note {
        writeln!(out, "  Note:         {note}")?;
    }

    let m = &rec.market;
    writeln!(out, "\nMarket")?;
    writeln!(out, "  Price:        ${:.2}", m.current_price)?;
    writeln!(out, "  IV rank:      {:.1}", m.iv_rank)?;
    writeln!(out, "  Trend:        {} ({})", m.trend_name(), m.trend_strength)?;
    writeln!(out, "  ADX / RSI:    {:.1} / {:.1}", m.adx_14, m.rsi_14)?;

    let v = &rec.validation;
    writeln!(out, "\nRisk")?;
    writeln!(out, "  Status:       {}", if v.approved { "APPROVED" } else { "REJECTED" })?;
    writeln!(out, "  Reward/risk:  {:.2}", v.risk_reward_ratio)?;
    writeln!(out, "  Account risk: {:.2}%", v.risk_percentage * 100.0)?;
    for reason in &v.rejections {
        writeln!(out, "  - {reason}")?;
    }

    let others: Vec<_> = rec.alternatives.iter().filter(|a| a.label != rec.label).collect();
    if !others.is_empty() {
        writeln!(out, "\nAlternatives")?;
        for alt in others {
            writeln!(out, "  {:<18} {:.1}%", alt.label.as_str(), alt.probability * 100.0)?;
        }
    }
    writeln!(out, "{RULE}")
}
