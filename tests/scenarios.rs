//! End-to-end checks for the documented scenarios, driven through the
//! library exactly as the CLI commands drive it.

use chrono::{Duration, NaiveDate, NaiveTime, TimeZone, Utc};

use homebase::config::{Activity, AppConfig, HouseholdConfig, PpcThresholds};
use homebase::engine::{ppc, reminders, report, reviews};
use homebase::ingest::campaigns::Campaign;
use homebase::ingest::orders::Order;
use homebase::ledger::{Ledger, MemoryLedger, SqliteLedger};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 6).unwrap()
}

fn now_utc() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 6, 12, 0, 0).unwrap()
}

fn order(email: &str, days_ago: i64, status: &str) -> Order {
    Order {
        order_id: format!("{email}-{days_ago}"),
        email: email.into(),
        buyer_name: "Jamie Rivera".into(),
        product: "Premium Plant Food Concentrate".into(),
        price: 24.99,
        order_date: Some(today() - Duration::days(days_ago)),
        status: status.into(),
    }
}

#[test]
fn scenario_1_repeat_customer_gets_one_draft() {
    // Order 10 days ago, delivered, 3rd purchase, not in ledger
    let orders = vec![
        order("jamie@example.com", 10, "Delivered"),
        order("jamie@example.com", 60, "Delivered"),
        order("jamie@example.com", 120, "Delivered"),
    ];
    let config = AppConfig::default();
    let ledger = MemoryLedger::new();

    let customers = reviews::group_customers(&orders);
    let selection =
        reviews::select_eligible(&customers, today(), now_utc(), &config.reviews, &ledger)
            .unwrap();

    assert_eq!(selection.eligible.len(), 1);
    let draft = reviews::build_draft(&selection.eligible[0], &config.reviews);
    assert!(draft.contains("Hi Jamie,"));
    assert!(draft.contains("Premium Plant Food Concentrate"));
}

#[test]
fn scenario_2_too_recent_excluded_for_any_purchase_count() {
    let orders = vec![
        order("jamie@example.com", 3, "Delivered"),
        order("jamie@example.com", 60, "Delivered"),
        order("jamie@example.com", 90, "Delivered"),
        order("jamie@example.com", 120, "Delivered"),
        order("jamie@example.com", 150, "Delivered"),
    ];
    let config = AppConfig::default();
    let ledger = MemoryLedger::new();

    let selection = reviews::select_eligible(
        &reviews::group_customers(&orders),
        today(),
        now_utc(),
        &config.reviews,
        &ledger,
    )
    .unwrap();
    assert!(selection.eligible.is_empty());
}

#[test]
fn scenario_3_zero_sales_with_spend_pauses() {
    let campaign = Campaign {
        name: "Auto Broad".into(),
        spend: 50.0,
        sales: 0.0,
        clicks: 25,
        impressions: 4000,
        roas: None,
    };
    let analysis = ppc::analyze(&campaign, &PpcThresholds::default());
    assert_eq!(analysis.action, ppc::Action::Pause);
    // ACOS is insufficient data, never a division error
    assert_eq!(analysis.acos, None);
}

#[test]
fn scenario_4_below_click_floor_is_excluded_from_judgment() {
    let campaign = Campaign {
        name: "Thin Data".into(),
        spend: 400.0,
        sales: 0.0,
        clicks: 5,
        impressions: 9000,
        roas: None,
    };
    let analysis = ppc::analyze(&campaign, &PpcThresholds::default());
    assert!(!analysis.judged);
    assert_eq!(analysis.action, ppc::Action::Hold);
}

fn household_with_5pm_event() -> HouseholdConfig {
    let mut cfg = HouseholdConfig::default();
    cfg.activities.push(Activity {
        name: "Tumbling".into(),
        kids: vec!["Reese".into()],
        day: "thursday".into(),
        start: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
        duration_minutes: 60,
        prep_minutes: Some(30),
        prep_message: None,
    });
    cfg
}

#[test]
fn scenario_5_lead_window_and_single_send() {
    let cfg = household_with_5pm_event();
    let ledger = MemoryLedger::new();
    let plan = reminders::plan_for_day(&cfg, &[], today());

    let at = |h, m| today().and_time(NaiveTime::from_hms_opt(h, m, 0).unwrap());

    // 16:40 with lead window [15, 30]: eligible
    let due = reminders::due(&plan, at(16, 40), &cfg, &ledger, today()).unwrap();
    assert_eq!(due.len(), 1);

    // 16:05: not yet eligible
    assert!(reminders::due(&plan, at(16, 5), &cfg, &ledger, today())
        .unwrap()
        .is_empty());

    // After a send is recorded, never eligible again
    ledger
        .record(&reminders::reminder_key(&due[0], today()), now_utc())
        .unwrap();
    assert!(reminders::due(&plan, at(16, 42), &cfg, &ledger, today())
        .unwrap()
        .is_empty());
}

#[test]
fn cooldown_holds_across_runs_through_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let pool = homebase::db::init_db(dir.path()).unwrap();
    let config = AppConfig::default();

    let orders = vec![
        order("jamie@example.com", 10, "Delivered"),
        order("jamie@example.com", 60, "Delivered"),
    ];
    let customers = reviews::group_customers(&orders);

    // First run: eligible, then recorded in the ledger
    let ledger = SqliteLedger::new(pool.clone());
    let first =
        reviews::select_eligible(&customers, today(), now_utc(), &config.reviews, &ledger)
            .unwrap();
    assert_eq!(first.eligible.len(), 1);
    ledger.record("jamie@example.com", now_utc()).unwrap();

    // Second run, fresh ledger handle over the same database: excluded
    let second_ledger = SqliteLedger::new(pool);
    let second = reviews::select_eligible(
        &customers,
        today(),
        now_utc() + chrono::Duration::days(1),
        &config.reviews,
        &second_ledger,
    )
    .unwrap();
    assert!(second.eligible.is_empty());
}

#[test]
fn artifacts_are_dated_and_append_only() {
    let dir = tempfile::tempdir().unwrap();
    let header = ["campaign", "action"];

    let first = report::append_csv(
        dir.path(),
        today(),
        "actions",
        &header,
        &[vec!["A".into(), "PAUSE".into()]],
    )
    .unwrap();
    assert!(first.ends_with("2026-08-06_actions.csv"));

    report::append_csv(
        dir.path(),
        today(),
        "actions",
        &header,
        &[vec!["B".into(), "REDUCE_BID".into()]],
    )
    .unwrap();

    let content = std::fs::read_to_string(&first).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    // Header written once, earlier rows never overwritten
    assert_eq!(lines, vec!["campaign,action", "A,PAUSE", "B,REDUCE_BID"]);
}
