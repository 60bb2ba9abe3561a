use std::path::Path;

use super::{parse_currency, parse_number, IngestStats, RowView};
use crate::error::AppError;

/// One row of an Amazon Advertising performance export.
#[derive(Debug, Clone)]
pub struct Campaign {
    /// Campaign name, the record identity in these exports.
    pub name: String,
    pub spend: f64,
    pub sales: f64,
    pub clicks: u64,
    pub impressions: u64,
    /// ROAS column when the export carries one.
    pub roas: Option<f64>,
}

/// Result of reading a campaign export.
#[derive(Debug)]
pub struct CampaignImport {
    pub campaigns: Vec<Campaign>,
    pub stats: IngestStats,
}

const NAME_ALIASES: &[&str] = &["Campaign name", "Campaign Name", "Campaign"];
const SPEND_ALIASES: &[&str] = &["Total cost", "Spend", "Cost", "Total Cost"];
const SALES_ALIASES: &[&str] = &["Sales", "Sales (promoted)", "Total Sales"];
const CLICKS_ALIASES: &[&str] = &["Clicks", "Gross clicks", "Total Clicks"];
const IMPRESSIONS_ALIASES: &[&str] = &["Impressions", "Total Impressions"];
const ROAS_ALIASES: &[&str] = &["ROAS", "ROAS (promoted)"];

/// Read a campaign export. Exports are UTF-8 with an occasional BOM and
/// currency-formatted numerics. Rows without a campaign name are dropped
/// and counted.
pub fn load_campaigns(path: &Path) -> Result<CampaignImport, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| {
            AppError::Config(format!("cannot read campaigns from {}: {e}", path.display()))
        })?;

    let headers = reader.headers()?.clone();
    let mut campaigns = Vec::new();
    let mut stats = IngestStats::default();

    for (idx, record) in reader.records().enumerate() {
        let row_no = idx + 1;
        stats.rows_read += 1;

        let record = match record {
            Ok(r) => r,
            Err(e) => {
                stats.drop_row(row_no, format!("unreadable row: {e}"));
                continue;
            }
        };
        let row = RowView::new(&headers, &record);

        let Some(name) = row.get(NAME_ALIASES) else {
            stats.drop_row(row_no, "missing campaign name");
            continue;
        };

        let roas = row.get(ROAS_ALIASES).map(|raw| parse_number(Some(raw)));

        campaigns.push(Campaign {
            name: name.to_string(),
            spend: parse_currency(row.get(SPEND_ALIASES)),
            sales: parse_currency(row.get(SALES_ALIASES)),
            clicks: parse_number(row.get(CLICKS_ALIASES)) as u64,
            impressions: parse_number(row.get(IMPRESSIONS_ALIASES)) as u64,
            roas: roas.filter(|r| *r > 0.0),
        });
    }

    tracing::info!(
        read = stats.rows_read,
        dropped = stats.rows_dropped,
        "Campaign export loaded"
    );
    Ok(CampaignImport { campaigns, stats })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn test_load_campaigns_with_bom_and_currency() {
        let f = write_csv(
            "\u{feff}Campaign name,Total cost,Sales,Clicks,Impressions\n\
             Garden Pro Auto,\"$1,250.40\",\"$4,100.00\",320,15000\n\
             Seed Starter,\"$50.00\",$0.00,25,2000\n",
        );
        let import = load_campaigns(f.path()).unwrap();
        assert_eq!(import.campaigns.len(), 2);

        let first = &import.campaigns[0];
        assert_eq!(first.name, "Garden Pro Auto");
        assert_eq!(first.spend, 1250.40);
        assert_eq!(first.sales, 4100.0);
        assert_eq!(first.clicks, 320);
        assert_eq!(first.impressions, 15000);
        assert_eq!(first.roas, None);
    }

    #[test]
    fn test_missing_name_dropped() {
        let f = write_csv(
            "Campaign name,Spend\n\
             ,\"$10.00\"\n\
             Real Campaign,$20.00\n",
        );
        let import = load_campaigns(f.path()).unwrap();
        assert_eq!(import.campaigns.len(), 1);
        assert_eq!(import.stats.rows_dropped, 1);
    }

    #[test]
    fn test_roas_column_captured_when_positive() {
        let f = write_csv(
            "Campaign,Cost,ROAS\n\
             A,$10.00,3.2\n\
             B,$10.00,0\n",
        );
        let import = load_campaigns(f.path()).unwrap();
        assert_eq!(import.campaigns[0].roas, Some(3.2));
        assert_eq!(import.campaigns[1].roas, None);
    }
}
