use std::cmp::Ordering;

use serde::Serialize;

use crate::config::PpcThresholds;
use crate::ingest::campaigns::Campaign;

/// Recommended action for one campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Pause,
    UrgentReview,
    ReduceBid,
    IncreaseBid,
    ReviewCreatives,
    Hold,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Pause => "PAUSE",
            Action::UrgentReview => "URGENT_REVIEW",
            Action::ReduceBid => "REDUCE_BID",
            Action::IncreaseBid => "INCREASE_BID",
            Action::ReviewCreatives => "REVIEW_CREATIVES",
            Action::Hold => "HOLD",
        }
    }

    pub fn actionable(&self) -> bool {
        !matches!(self, Action::Hold)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "HIGH",
            Priority::Medium => "MEDIUM",
            Priority::Low => "LOW",
        }
    }
}

/// Full analysis of one campaign row.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub campaign: String,
    pub spend: f64,
    pub sales: f64,
    /// None when sales are zero and no ROAS column exists; that is
    /// insufficient data, not a division error.
    pub acos: Option<f64>,
    pub roas: Option<f64>,
    pub clicks: u64,
    pub impressions: u64,
    /// Percent, None when impressions are zero.
    pub ctr: Option<f64>,
    pub cpc: Option<f64>,
    pub action: Action,
    pub priority: Priority,
    pub reason: String,
    /// False when the record never reached the decision table.
    pub judged: bool,
}

/// ACOS from sales, falling back to the export's ROAS column.
fn compute_acos(campaign: &Campaign) -> Option<f64> {
    if campaign.sales > 0.0 {
        Some(campaign.spend / campaign.sales)
    } else {
        campaign.roas.map(|roas| 1.0 / roas)
    }
}

fn pct(v: f64) -> String {
    format!("{:.1}%", v * 100.0)
}

/// Classify one campaign against the thresholds.
///
/// Judgment requires `min_clicks`; below that the record is excluded from
/// flagging entirely. The decision table is checked in fixed precedence
/// order, so a record gets exactly one action.
pub fn analyze(campaign: &Campaign, t: &PpcThresholds) -> Analysis {
    let acos = compute_acos(campaign);
    let ctr = if campaign.impressions > 0 {
        Some(campaign.clicks as f64 / campaign.impressions as f64 * 100.0)
    } else {
        None
    };
    let cpc = if campaign.clicks > 0 {
        Some(campaign.spend / campaign.clicks as f64)
    } else {
        None
    };
    let roas = campaign.roas.or_else(|| {
        if campaign.spend > 0.0 && campaign.sales > 0.0 {
            Some(campaign.sales / campaign.spend)
        } else {
            None
        }
    });

    let mut analysis = Analysis {
        campaign: campaign.name.clone(),
        spend: campaign.spend,
        sales: campaign.sales,
        acos,
        roas,
        clicks: campaign.clicks,
        impressions: campaign.impressions,
        ctr,
        cpc,
        action: Action::Hold,
        priority: Priority::Low,
        reason: String::new(),
        judged: false,
    };

    if campaign.clicks < t.min_clicks as u64 {
        analysis.reason = format!(
            "Not enough clicks ({} < {})",
            campaign.clicks, t.min_clicks
        );
        return analysis;
    }
    analysis.judged = true;

    // CTR is only meaningful once impressions clear their own threshold.
    let ctr_known = campaign.impressions >= t.min_impressions as u64;
    let ctr_good = ctr_known && ctr.is_some_and(|c| c >= t.min_ctr_pct);
    let ctr_low = ctr_known && ctr.is_some_and(|c| c < t.min_ctr_pct);

    // Decision table, first match wins.
    if campaign.sales == 0.0 && campaign.spend > 0.0 {
        analysis.action = Action::Pause;
        analysis.priority = Priority::High;
        analysis.reason = format!(
            "${:.2} spent with zero attributed sales. Pause and rework targeting.",
            campaign.spend
        );
        return analysis;
    }

    let Some(acos) = acos else {
        // No spend, no sales: nothing to act on.
        analysis.reason = "No spend and no sales in this window".into();
        return analysis;
    };

    if acos > t.pause_threshold_acos {
        analysis.action = Action::UrgentReview;
        analysis.priority = Priority::High;
        analysis.reason = format!(
            "ACOS {} is very high (target: {}). Consider pausing or aggressive bid reduction.",
            pct(acos),
            pct(t.target_acos)
        );
    } else if acos > t.target_acos {
        analysis.action = Action::ReduceBid;
        analysis.priority = Priority::Medium;
        analysis.reason = format!(
            "ACOS {} above target {}. Reduce bids by ~{:.0}%.",
            pct(acos),
            pct(t.target_acos),
            t.bid_down_pct * 100.0
        );
    } else if acos < t.target_acos * t.scale_acos_factor && ctr_good {
        analysis.action = Action::IncreaseBid;
        analysis.priority = Priority::High;
        analysis.reason = format!(
            "Excellent ACOS {}. Increase bids by {:.0}% to scale.",
            pct(acos),
            t.bid_up_pct * 100.0
        );
    } else if acos < t.target_acos * t.good_acos_factor && ctr_good {
        analysis.action = Action::IncreaseBid;
        analysis.priority = Priority::Medium;
        analysis.reason = format!(
            "Good ACOS {}. Increase bids slightly to capture more sales.",
            pct(acos)
        );
    } else if ctr_low {
        analysis.action = Action::ReviewCreatives;
        analysis.priority = Priority::Medium;
        analysis.reason = format!(
            "Low CTR {:.2}%. Review images, titles, and targeting.",
            ctr.unwrap_or(0.0)
        );
    } else {
        analysis.reason = match ctr {
            Some(c) => format!("Performing well (ACOS: {}, CTR: {:.2}%)", pct(acos), c),
            None => format!("Performing well (ACOS: {})", pct(acos)),
        };
    }
    analysis
}

/// Analyze every campaign, ordered by priority then spend.
pub fn analyze_all(campaigns: &[Campaign], t: &PpcThresholds) -> Vec<Analysis> {
    let mut results: Vec<Analysis> = campaigns.iter().map(|c| analyze(c, t)).collect();
    results.sort_by(|a, b| match a.priority.cmp(&b.priority) {
        Ordering::Equal => b.spend.partial_cmp(&a.spend).unwrap_or(Ordering::Equal),
        other => other,
    });
    results
}

/// Spend/sales/ACOS totals for the console wrap-up.
pub fn totals(results: &[Analysis]) -> (f64, f64, Option<f64>) {
    let spend: f64 = results.iter().map(|r| r.spend).sum();
    let sales: f64 = results.iter().map(|r| r.sales).sum();
    let acos = if sales > 0.0 { Some(spend / sales) } else { None };
    (spend, sales, acos)
}

pub const SUMMARY_HEADER: &[&str] = &[
    "campaign", "spend", "sales", "acos", "roas", "clicks", "impressions", "ctr", "cpc",
    "action", "priority", "reason",
];

pub fn summary_row(r: &Analysis) -> Vec<String> {
    vec![
        r.campaign.clone(),
        format!("${:.2}", r.spend),
        format!("${:.2}", r.sales),
        r.acos.map(pct).unwrap_or_else(|| "n/a".into()),
        r.roas.map(|v| format!("{v:.2}")).unwrap_or_else(|| "n/a".into()),
        r.clicks.to_string(),
        r.impressions.to_string(),
        r.ctr.map(|v| format!("{v:.2}%")).unwrap_or_else(|| "n/a".into()),
        r.cpc.map(|v| format!("${v:.2}")).unwrap_or_else(|| "n/a".into()),
        r.action.as_str().into(),
        r.priority.as_str().into(),
        r.reason.clone(),
    ]
}

pub const ACTIONS_HEADER: &[&str] =
    &["priority", "campaign", "action", "acos", "spend", "sales", "reason"];

pub fn actions_row(r: &Analysis) -> Vec<String> {
    vec![
        r.priority.as_str().into(),
        r.campaign.clone(),
        r.action.as_str().into(),
        r.acos.map(pct).unwrap_or_else(|| "n/a".into()),
        format!("${:.2}", r.spend),
        format!("${:.2}", r.sales),
        r.reason.clone(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn campaign(spend: f64, sales: f64, clicks: u64, impressions: u64) -> Campaign {
        Campaign {
            name: "Test".into(),
            spend,
            sales,
            clicks,
            impressions,
            roas: None,
        }
    }

    fn defaults() -> PpcThresholds {
        PpcThresholds::default()
    }

    #[test]
    fn test_scenario_zero_sales_with_spend_is_pause() {
        // 25 clicks, $50 spend, $0 sales
        let a = analyze(&campaign(50.0, 0.0, 25, 2000), &defaults());
        assert!(a.judged);
        assert_eq!(a.action, Action::Pause);
        assert_eq!(a.priority, Priority::High);
        assert_eq!(a.acos, None);
    }

    #[test]
    fn test_scenario_below_min_clicks_is_insufficient_data() {
        // 5 clicks, high spend: excluded from judgment entirely
        let a = analyze(&campaign(500.0, 0.0, 5, 10000), &defaults());
        assert!(!a.judged);
        assert_eq!(a.action, Action::Hold);
        assert!(a.reason.contains("Not enough clicks"));
    }

    #[test]
    fn test_zero_sales_never_flags_high_acos() {
        let a = analyze(&campaign(100.0, 0.0, 30, 5000), &defaults());
        assert_eq!(a.acos, None);
        assert_ne!(a.action, Action::UrgentReview);
        assert_ne!(a.action, Action::ReduceBid);
    }

    #[test]
    fn test_high_acos_is_urgent_review() {
        // ACOS = 60%
        let a = analyze(&campaign(60.0, 100.0, 30, 5000), &defaults());
        assert_eq!(a.action, Action::UrgentReview);
        assert_eq!(a.priority, Priority::High);
    }

    #[test]
    fn test_above_target_acos_reduces_bid() {
        // ACOS = 40%, between target 30% and pause threshold 50%
        let a = analyze(&campaign(40.0, 100.0, 30, 5000), &defaults());
        assert_eq!(a.action, Action::ReduceBid);
        assert!(a.reason.contains("15%"));
    }

    #[test]
    fn test_excellent_acos_with_good_ctr_scales_up() {
        // ACOS = 10%, CTR = 0.6%
        let a = analyze(&campaign(10.0, 100.0, 30, 5000), &defaults());
        assert_eq!(a.action, Action::IncreaseBid);
        assert_eq!(a.priority, Priority::High);
    }

    #[test]
    fn test_good_acos_with_good_ctr_scales_up_gently() {
        // ACOS = 24%, below 85% of target but above 60%
        let a = analyze(&campaign(24.0, 100.0, 30, 5000), &defaults());
        assert_eq!(a.action, Action::IncreaseBid);
        assert_eq!(a.priority, Priority::Medium);
    }

    #[test]
    fn test_low_ctr_flags_creatives() {
        // ACOS on target-ish (28%), CTR 0.1% with plenty of impressions
        let a = analyze(&campaign(28.0, 100.0, 30, 30000), &defaults());
        assert_eq!(a.action, Action::ReviewCreatives);
    }

    #[test]
    fn test_few_impressions_blocks_ctr_rules_not_acos_rules() {
        // 100 impressions is below min_impressions: no CTR judgment, but
        // the ACOS money leak is still flagged.
        let a = analyze(&campaign(60.0, 100.0, 30, 100), &defaults());
        assert_eq!(a.action, Action::UrgentReview);

        // Excellent ACOS but unknown CTR: no bid-up without CTR evidence
        let b = analyze(&campaign(10.0, 100.0, 30, 100), &defaults());
        assert_eq!(b.action, Action::Hold);
    }

    #[test]
    fn test_zero_impressions_ctr_is_none() {
        let a = analyze(&campaign(10.0, 100.0, 30, 0), &defaults());
        assert_eq!(a.ctr, None);
    }

    #[test]
    fn test_roas_column_backfills_acos() {
        let c = Campaign {
            name: "Roas Only".into(),
            spend: 50.0,
            sales: 0.0,
            clicks: 30,
            impressions: 5000,
            roas: Some(2.0),
        };
        let a = analyze(&c, &defaults());
        // 1/2.0 = 50% ACOS, but zero-sales-with-spend still wins precedence
        assert_eq!(a.action, Action::Pause);
        assert_eq!(a.acos, Some(0.5));
    }

    #[test]
    fn test_sorting_by_priority_then_spend() {
        let campaigns = vec![
            campaign(10.0, 100.0, 30, 5000),  // IncreaseBid High
            campaign(500.0, 0.0, 30, 5000),   // Pause High, higher spend
            campaign(40.0, 100.0, 30, 5000),  // ReduceBid Medium
            campaign(1.0, 100.0, 5, 5000),    // insufficient, Low
        ];
        let results = analyze_all(&campaigns, &defaults());
        assert_eq!(results[0].action, Action::Pause);
        assert_eq!(results[0].spend, 500.0);
        assert_eq!(results[1].action, Action::IncreaseBid);
        assert_eq!(results[2].action, Action::ReduceBid);
        assert!(!results[3].judged);
    }

    #[test]
    fn test_analysis_serializes_for_json_output() {
        let a = analyze(&campaign(50.0, 0.0, 25, 2000), &defaults());
        let json = serde_json::to_string(&a).unwrap();
        assert!(json.contains("\"action\":\"PAUSE\""));
        assert!(json.contains("\"priority\":\"HIGH\""));
    }

    #[test]
    fn test_totals() {
        let results = analyze_all(
            &[campaign(50.0, 200.0, 30, 5000), campaign(50.0, 0.0, 30, 5000)],
            &defaults(),
        );
        let (spend, sales, acos) = totals(&results);
        assert_eq!(spend, 100.0);
        assert_eq!(sales, 200.0);
        assert_eq!(acos, Some(0.5));
    }
}
