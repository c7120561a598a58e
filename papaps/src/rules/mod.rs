//! Moteur de règles de classification
//!
//! Fonction pure et totale : attributs d'une feature → (arahan, kewajiban,
//! ruang). La décision est un pli sur une liste ordonnée de portes, chacune
//! recevant et rendant un `Verdict`.

pub mod codes;
pub mod fields;

pub use codes::{Category, CodeSet, Directive, DirectiveSet, Obligation, ObligationSet};
pub use fields::{Attributes, Fields};

use geo::MultiPolygon;
use serde::Serialize;

use crate::overlay::ClippedFeature;
use Directive::*;

/// Identifiants du plan d'occupation (PL2024_ID) déclenchant la porte de risque
const RISK_LAND_COVER: [f64; 6] = [2001.0, 2002.0, 2004.0, 2005.0, 20041.0, 20051.0];

/// Bande d'altitude déclenchant la porte de risque
const RISK_ELEVATION_BAND: f64 = 2000.0;

const ECO_PROTECTION: &str = "Indikatif Fungsi Lindung E.G.";
const ECO_CULTIVATION: &str = "Indikatif Fungsi Budidaya E.G.";

/// État intermédiaire du pli
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub category: Category,
    pub candidates: DirectiveSet,
    /// Porte hutan lindung passée
    pub protection_forest: bool,
    /// Une des deux valeurs feg_kghltr reconnue
    pub ecological: bool,
}

impl Default for Verdict {
    fn default() -> Self {
        Self {
            category: Category::Utilization,
            candidates: DirectiveSet::of(&[A1, A2, A3, A4, A5]),
            protection_forest: false,
            ecological: false,
        }
    }
}

type Gate = fn(&Fields, Verdict) -> Verdict;

/// Portes dans l'ordre d'application
const GATES: [Gate; 4] = [protection_forest, peatland, ecological_function, physical_risk];

/// Résultat de la classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Classification {
    /// Jamais vide (repli sur A6)
    pub directive: DirectiveSet,
    pub obligation: ObligationSet,
    pub category: Category,
}

/// Feature découpée et classée
#[derive(Debug, Clone)]
pub struct ClassifiedFeature {
    pub geometry: MultiPolygon<f64>,
    pub attributes: Attributes,
    pub classification: Classification,
}

/// Classe une feature depuis ses attributs bruts
pub fn classify(attributes: &Attributes) -> Classification {
    classify_fields(&Fields::from_attributes(attributes))
}

/// Classe des champs déjà normalisés
pub fn classify_fields(fields: &Fields) -> Classification {
    let verdict = GATES
        .iter()
        .fold(Verdict::default(), |verdict, gate| gate(fields, verdict));

    let directive = if verdict.candidates.is_empty() {
        DirectiveSet::of(&[A6])
    } else {
        verdict.candidates
    };

    Classification {
        directive,
        obligation: obligations(fields, &verdict),
        category: verdict.category,
    }
}

pub fn classify_feature(feature: ClippedFeature) -> ClassifiedFeature {
    let classification = classify(&feature.attributes);
    ClassifiedFeature {
        geometry: feature.geometry,
        attributes: feature.attributes,
        classification,
    }
}

/// K2 si feg_kghltr reconnu, K3 si RURHL/KRITIS, K1 si SAWIT == 1
pub fn obligations(fields: &Fields, verdict: &Verdict) -> ObligationSet {
    let mut set = ObligationSet::empty();
    if verdict.ecological {
        set.insert(Obligation::K2);
    }
    if fields.rurhl == "RURHL" || fields.kritis.contains("KRITIS") {
        set.insert(Obligation::K3);
    }
    if fields.sawit == 1.0 {
        set.insert(Obligation::K1);
    }
    set
}

fn protection_forest(fields: &Fields, verdict: Verdict) -> Verdict {
    if matches!(fields.f_kws.as_str(), "HL" | "HUTAN LINDUNG") {
        Verdict {
            category: Category::Protection,
            candidates: DirectiveSet::of(&[A1, A2, A4]),
            protection_forest: true,
            ..verdict
        }
    } else {
        Verdict {
            category: Category::Utilization,
            candidates: DirectiveSet::of(&[A1, A2, A3, A4, A5]),
            protection_forest: false,
            ..verdict
        }
    }
}

fn peatland(fields: &Fields, verdict: Verdict) -> Verdict {
    if fields.pippib.contains("GAMBUT") || fields.pippib.contains("KAWASAN") {
        Verdict {
            candidates: verdict.candidates.retain(&[A1, A2, A3, A4]),
            ..verdict
        }
    } else {
        verdict
    }
}

fn ecological_function(fields: &Fields, verdict: Verdict) -> Verdict {
    match fields.feg_kghltr.as_str() {
        ECO_PROTECTION => Verdict {
            category: Category::Protection,
            candidates: DirectiveSet::of(&[A6]),
            ecological: true,
            ..verdict
        },
        ECO_CULTIVATION => Verdict {
            candidates: verdict.candidates.retain(&[A1, A2, A3, A4]),
            ecological: true,
            ..verdict
        },
        _ => verdict,
    }
}

fn physical_risk(fields: &Fields, verdict: Verdict) -> Verdict {
    let triggered = RISK_LAND_COVER.contains(&fields.pl2024_id)
        || fields.ketinggian == RISK_ELEVATION_BAND
        || [&fields.sungai_kec, &fields.spd_pantai, &fields.spd_danau]
            .iter()
            .any(|flag| flag.as_str() == "YA");

    if !triggered {
        return verdict;
    }

    let allowed: &[Directive] = if verdict.protection_forest {
        &[A2, A4]
    } else {
        &[A1, A2, A3, A4]
    };

    Verdict {
        category: Category::Protection,
        candidates: verdict.candidates.retain(allowed),
        ..verdict
    }
}
