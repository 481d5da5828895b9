//! Paginated record fetching.

use std::collections::HashSet;

use armlink_domain::{ArmLinkError, Record, Result};
use tracing::{debug, instrument};

use crate::crm_ports::CrmClient;

/// Runs `soql` and follows continuation cursors until the CRM reports no
/// more pages. Records keep the order the server returned them in.
///
/// Any page failure fails the whole fetch; a cursor that comes back twice
/// is treated as a CRM fault rather than followed forever.
#[instrument(skip_all)]
pub async fn fetch_all(crm: &dyn CrmClient, soql: &str) -> Result<Vec<Record>> {
    let mut page = crm.query(soql).await?;
    let mut records = std::mem::take(&mut page.records);
    let mut seen = HashSet::new();
    let mut pages = 1_usize;

    while let Some(cursor) = page.next_cursor.take() {
        if !seen.insert(cursor.clone()) {
            return Err(ArmLinkError::Crm(format!("query cursor {cursor} returned twice")));
        }
        page = crm.query_more(&cursor).await?;
        records.append(&mut page.records);
        pages += 1;
    }

    debug!(pages, records = records.len(), "query complete");
    Ok(records)
}
