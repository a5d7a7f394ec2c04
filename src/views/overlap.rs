//! Set overlap between two or three selected tickers (or holders), as the data
//! behind a Venn diagram.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::core::HoldingsError;
use crate::pipeline::EnrichedPosition;

/// What the selected items are. Members are always the other kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Entity {
    /// Items are tickers; members are the holders of each.
    Ticker,
    /// Items are holders; members are the tickers each holds.
    Owner,
}

/// Members found in exactly the items listed in `items` and no others.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Region {
    pub items: Vec<String>,
    pub members: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Overlap {
    pub entity: Entity,
    /// The selected items with their full member sets, in selection order.
    pub sets: Vec<(String, BTreeSet<String>)>,
    /// Every non-empty combination of items, singles first.
    pub regions: Vec<Region>,
}

impl Overlap {
    /// Members that belong to `item` only.
    pub fn exclusive(&self, item: &str) -> Option<&BTreeSet<String>> {
        self.regions
            .iter()
            .find(|r| r.items.len() == 1 && r.items[0] == item)
            .map(|r| &r.members)
    }

    /// Members common to every selected item.
    pub fn shared_by_all(&self) -> &BTreeSet<String> {
        // The full combination is always the last region.
        &self.regions[self.regions.len() - 1].members
    }
}

/// Computes the Venn regions for 2 or 3 `items`.
///
/// # Errors
///
/// [`HoldingsError::InvalidParams`] for fewer than 2 or more than 3 items, or duplicates.
pub fn overlap<'a, I, S>(rows: I, entity: Entity, items: &[S]) -> Result<Overlap, HoldingsError>
where
    I: IntoIterator<Item = &'a EnrichedPosition>,
    S: AsRef<str>,
{
    let names: Vec<String> = items.iter().map(|s| s.as_ref().to_string()).collect();
    if !(2..=3).contains(&names.len()) {
        return Err(HoldingsError::InvalidParams(format!(
            "overlap needs 2 or 3 items, got {}",
            names.len()
        )));
    }
    if names.iter().collect::<BTreeSet<_>>().len() != names.len() {
        return Err(HoldingsError::InvalidParams(
            "overlap items must be distinct".into(),
        ));
    }

    let mut sets: Vec<BTreeSet<String>> = vec![BTreeSet::new(); names.len()];
    for r in rows {
        let (item, member) = match entity {
            Entity::Ticker => (&r.ticker, &r.owner),
            Entity::Owner => (&r.owner, &r.ticker),
        };
        if let Some(i) = names.iter().position(|n| n == item) {
            sets[i].insert(member.clone());
        }
    }

    let all: BTreeSet<&String> = sets.iter().flatten().collect();
    let k = names.len();
    let mut masks: Vec<u32> = (1..(1u32 << k)).collect();
    masks.sort_by_key(|m| (m.count_ones(), *m));

    let regions = masks
        .into_iter()
        .map(|mask| {
            let inside = |i: usize| mask & (1 << i) != 0;
            let members = all
                .iter()
                .filter(|m| (0..k).all(|i| sets[i].contains(**m) == inside(i)))
                .map(|m| (*m).clone())
                .collect();
            Region {
                items: (0..k).filter(|&i| inside(i)).map(|i| names[i].clone()).collect(),
                members,
            }
        })
        .collect();

    Ok(Overlap {
        entity,
        sets: names.into_iter().zip(sets).collect(),
        regions,
    })
}
