//! Agrégation par catégorie (dissolve)

use std::collections::BTreeMap;

use geo::{unary_union, MultiPolygon, Polygon};
use tracing::debug;

use crate::area::AreaRecord;
use crate::rules::Classification;

/// Une ligne par triplet (arahan, kewajiban, ruang) distinct
#[derive(Debug, Clone)]
pub struct AggregatedResult {
    pub classification: Classification,
    /// Union des géométries du groupe
    pub geometry: MultiPolygon<f64>,
    /// Somme des surfaces des membres (pas la surface de l'union)
    pub hectares: f64,
    pub members: usize,
}

#[derive(Default)]
struct Group {
    polygons: Vec<Polygon<f64>>,
    hectares: f64,
    members: usize,
}

/// Regroupe les enregistrements par classification, triés par clé
pub fn aggregate(records: Vec<AreaRecord>) -> Vec<AggregatedResult> {
    let mut groups: BTreeMap<Classification, Group> = BTreeMap::new();

    for record in records {
        let group = groups.entry(record.feature.classification).or_default();
        group.polygons.extend(record.feature.geometry);
        group.hectares += record.hectares;
        group.members += 1;
    }

    debug!(groups = groups.len(), "Records aggregated");

    groups
        .into_iter()
        .map(|(classification, group)| AggregatedResult {
            classification,
            geometry: unary_union(&group.polygons),
            hectares: group.hectares,
            members: group.members,
        })
        .collect()
}

/// Surface totale des lignes agrégées
pub fn total_hectares(results: &[AggregatedResult]) -> f64 {
    results.iter().map(|r| r.hectares).sum()
}
