//! Lecture des attributs de la couche de référence, nulls inclus

use serde_json::{Map, Value};

/// Attributs d'une feature de référence
pub type Attributes = Map<String, Value>;

/// Noms des champs de la couche thématique
pub mod names {
    pub const F_KWS: &str = "F_KWS";
    pub const PIPPIB: &str = "PIPPIB";
    pub const FEG_KGHLTR: &str = "feg_kghltr";
    pub const PL2024_ID: &str = "PL2024_ID";
    pub const KETINGGIAN: &str = "Ketinggian";
    pub const SUNGAI_KEC: &str = "Sungai_Kec";
    pub const SPD_PANTAI: &str = "Spd_Pantai";
    pub const SPD_DANAU: &str = "Spd_Danau";
    pub const RURHL: &str = "RURHL";
    pub const KRITIS: &str = "KRITIS";
    pub const SAWIT: &str = "SAWIT";
}

/// Champs normalisés consommés par le moteur de règles
///
/// Un champ absent ou null vaut `""` (texte) ou `0` (nombre). Les textes
/// sont nettoyés et mis en majuscules, sauf `feg_kghltr` dont les deux
/// valeurs sentinelles sont comparées à l'identique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields {
    pub f_kws: String,
    pub pippib: String,
    pub feg_kghltr: String,
    pub pl2024_id: f64,
    pub ketinggian: f64,
    pub sungai_kec: String,
    pub spd_pantai: String,
    pub spd_danau: String,
    pub rurhl: String,
    pub kritis: String,
    pub sawit: f64,
}

impl Fields {
    pub fn from_attributes(attributes: &Attributes) -> Self {
        let upper = |name: &str| text(lookup(attributes, name)).to_uppercase();
        let numeric = |name: &str| number(lookup(attributes, name));

        Self {
            f_kws: upper(names::F_KWS),
            pippib: upper(names::PIPPIB),
            feg_kghltr: text(lookup(attributes, names::FEG_KGHLTR)),
            pl2024_id: numeric(names::PL2024_ID),
            ketinggian: numeric(names::KETINGGIAN),
            sungai_kec: upper(names::SUNGAI_KEC),
            spd_pantai: upper(names::SPD_PANTAI),
            spd_danau: upper(names::SPD_DANAU),
            rurhl: upper(names::RURHL),
            kritis: upper(names::KRITIS),
            sawit: numeric(names::SAWIT),
        }
    }
}

/// Nom exact d'abord, puis insensible à la casse
fn lookup<'a>(attributes: &'a Attributes, name: &str) -> Option<&'a Value> {
    attributes.get(name).or_else(|| {
        attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    })
}

fn text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string(),
    }
}

fn number(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        Some(Value::Bool(b)) => f64::from(u8::from(*b)),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(value: Value) -> Attributes {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_missing_and_null_default() {
        let fields = Fields::from_attributes(&attrs(json!({"F_KWS": null, "SAWIT": null})));
        assert_eq!(fields, Fields::default());
    }

    #[test]
    fn test_text_is_trimmed_and_uppercased() {
        let fields = Fields::from_attributes(&attrs(json!({
            "F_KWS": "  hutan lindung ",
            "Sungai_Kec": "ya"
        })));
        assert_eq!(fields.f_kws, "HUTAN LINDUNG");
        assert_eq!(fields.sungai_kec, "YA");
    }

    #[test]
    fn test_feg_kghltr_keeps_case() {
        let fields = Fields::from_attributes(&attrs(json!({
            "feg_kghltr": " Indikatif Fungsi Lindung E.G. "
        })));
        assert_eq!(fields.feg_kghltr, "Indikatif Fungsi Lindung E.G.");
    }

    #[test]
    fn test_numbers_from_text() {
        let fields = Fields::from_attributes(&attrs(json!({
            "PL2024_ID": "20041",
            "Ketinggian": 2000,
            "SAWIT": "n/a"
        })));
        assert_eq!(fields.pl2024_id, 20041.0);
        assert_eq!(fields.ketinggian, 2000.0);
        assert_eq!(fields.sawit, 0.0);
    }

    #[test]
    fn test_number_as_text_field() {
        let fields = Fields::from_attributes(&attrs(json!({"RURHL": 1})));
        assert_eq!(fields.rurhl, "1");
    }

    #[test]
    fn test_case_insensitive_field_name() {
        let fields = Fields::from_attributes(&attrs(json!({"f_kws": "HL", "KETINGGIAN": 2000})));
        assert_eq!(fields.f_kws, "HL");
        assert_eq!(fields.ketinggian, 2000.0);
    }
}
