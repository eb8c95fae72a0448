use std::collections::{BTreeMap, HashMap};

use crate::model::{AnonymousGroup, DrNumber, PosGroup, PosLine, PrinterGroup, PrinterRecord};
use crate::pages::Pages;

/// Group POS lines by DR number: first invoice + customer, summed pages.
///
/// Groups come out in ascending DR order; lines without a DR number form a
/// single trailing group.
pub fn aggregate_pos(lines: &[PosLine]) -> Vec<PosGroup> {
    let mut groups: BTreeMap<DrNumber, PosGroup> = BTreeMap::new();
    let mut absent: Option<PosGroup> = None;

    for line in lines {
        let slot = match line.dr {
            Some(dr) => groups.entry(dr).or_insert_with(|| empty_pos_group(line)),
            None => absent.get_or_insert_with(|| empty_pos_group(line)),
        };
        slot.expected_pages += line.expected_pages;
        slot.line_count += 1;
    }

    groups.into_values().chain(absent).collect()
}

fn empty_pos_group(first: &PosLine) -> PosGroup {
    PosGroup {
        dr: first.dr,
        invoice: first.invoice.clone(),
        customer: first.customer.clone(),
        expected_pages: Pages::ZERO,
        line_count: 0,
    }
}

/// Group identified printer records by DR number, summing printed pages.
/// Records without a DR number are skipped.
pub fn aggregate_printed(records: &[PrinterRecord]) -> Vec<PrinterGroup> {
    let mut groups: BTreeMap<DrNumber, (Pages, usize)> = BTreeMap::new();

    for record in records {
        let Some(dr) = record.dr else {
            continue;
        };
        let entry = groups.entry(dr).or_insert((Pages::ZERO, 0));
        entry.0 += record.printed_pages;
        entry.1 += 1;
    }

    groups
        .into_iter()
        .map(|(dr, (printed_pages, job_count))| PrinterGroup {
            dr,
            printed_pages,
            job_count,
        })
        .collect()
}

/// Group anonymous printer records by (job name, owner): summed pages,
/// latest timestamp.
///
/// Groups keep first-appearance order, then are stably sorted by descending
/// page total, so ties stay in input order. Records that carry a DR number
/// are skipped.
pub fn summarize_anonymous(records: &[PrinterRecord]) -> Vec<AnonymousGroup> {
    let mut index: HashMap<(&str, &str), usize> = HashMap::new();
    let mut groups: Vec<AnonymousGroup> = Vec::new();

    for record in records.iter().filter(|r| r.dr.is_none()) {
        let key = (record.job_name.as_str(), record.owner.as_str());
        match index.get(&key) {
            Some(&i) => {
                let group = &mut groups[i];
                group.printed_pages += record.printed_pages;
                group.job_count += 1;
                if record.recorded_at > group.recorded_at {
                    group.recorded_at = record.recorded_at.clone();
                }
            }
            None => {
                index.insert(key, groups.len());
                groups.push(AnonymousGroup {
                    job_name: record.job_name.clone(),
                    artist: record.owner.clone(),
                    printed_pages: record.printed_pages,
                    recorded_at: record.recorded_at.clone(),
                    job_count: 1,
                });
            }
        }
    }

    groups.sort_by(|a, b| b.printed_pages.cmp(&a.printed_pages));
    groups
}
