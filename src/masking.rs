//! Label masking: hand-maintained dictionaries mapping the raw Greek and
//! English labels printed in the source workbooks to short dimension codes.
//!
//! Lookups go through [`normalize_label`], which folds case, Greek accents
//! and the final sigma, strips footnote markers and collapses whitespace, so
//! one dictionary entry covers the spelling drift between releases.

use crate::error::EtlError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum Dimension {
    #[strum(to_string = "TIME")]
    Time,
    #[strum(to_string = "SEX")]
    Sex,
    #[strum(to_string = "AGE")]
    AgeBand,
    #[strum(to_string = "REGION")]
    Region,
    #[strum(to_string = "OCC")]
    Occupation,
    #[strum(to_string = "STATUS")]
    Status,
    #[strum(to_string = "WORKTIME")]
    WorkTime,
    #[strum(to_string = "INDIC")]
    Indicator,
    #[strum(to_string = "MEASURE")]
    Measure,
}

type Pairs = &'static [(&'static str, &'static str)];

static SEX_PAIRS: Pairs = &[
    ("Σύνολο", "T"),
    ("Σύνολο και των δύο φύλων", "T"),
    ("Total", "T"),
    ("Both sexes", "T"),
    ("Άνδρες", "M"),
    ("Άρρενες", "M"),
    ("Males", "M"),
    ("Men", "M"),
    ("Γυναίκες", "F"),
    ("Θήλεις", "F"),
    ("Females", "F"),
    ("Women", "F"),
];

static AGE_PAIRS: Pairs = &[
    ("Σύνολο", "T"),
    ("Total", "T"),
    ("Όλες οι ηλικίες", "T"),
    ("All ages", "T"),
    ("14 και κάτω", "Y_LT15"),
    ("Up to 14", "Y_LT15"),
    ("15-19", "Y15-19"),
    ("20-24", "Y20-24"),
    ("15-24", "Y15-24"),
    ("15-29", "Y15-29"),
    ("25-29", "Y25-29"),
    ("25-54", "Y25-54"),
    ("30-44", "Y30-44"),
    ("45-64", "Y45-64"),
    ("55-64", "Y55-64"),
    ("65+", "Y_GE65"),
    ("65 και άνω", "Y_GE65"),
    ("65 ετών και άνω", "Y_GE65"),
    ("65 and over", "Y_GE65"),
];

static REGION_PAIRS: Pairs = &[
    ("Σύνολο Χώρας", "EL"),
    ("Ελλάδα", "EL"),
    ("Greece", "EL"),
    ("Greece, total", "EL"),
    ("Country total", "EL"),
    ("Αττική", "EL30"),
    ("Attiki", "EL30"),
    ("Attica", "EL30"),
    ("Βόρειο Αιγαίο", "EL41"),
    ("Voreio Aigaio", "EL41"),
    ("North Aegean", "EL41"),
    ("Νότιο Αιγαίο", "EL42"),
    ("Notio Aigaio", "EL42"),
    ("South Aegean", "EL42"),
    ("Κρήτη", "EL43"),
    ("Kriti", "EL43"),
    ("Crete", "EL43"),
    ("Ανατολική Μακεδονία και Θράκη", "EL51"),
    ("Ανατολική Μακεδονία, Θράκη", "EL51"),
    ("Anatoliki Makedonia, Thraki", "EL51"),
    ("Eastern Macedonia and Thrace", "EL51"),
    ("Κεντρική Μακεδονία", "EL52"),
    ("Kentriki Makedonia", "EL52"),
    ("Central Macedonia", "EL52"),
    ("Δυτική Μακεδονία", "EL53"),
    ("Dytiki Makedonia", "EL53"),
    ("Western Macedonia", "EL53"),
    ("Ήπειρος", "EL54"),
    ("Ipeiros", "EL54"),
    ("Epirus", "EL54"),
    ("Θεσσαλία", "EL61"),
    ("Thessalia", "EL61"),
    ("Thessaly", "EL61"),
    ("Ιόνια Νησιά", "EL62"),
    ("Ιόνιοι Νήσοι", "EL62"),
    ("Ionia Nisia", "EL62"),
    ("Ionian Islands", "EL62"),
    ("Δυτική Ελλάδα", "EL63"),
    ("Dytiki Ellada", "EL63"),
    ("Western Greece", "EL63"),
    ("Στερεά Ελλάδα", "EL64"),
    ("Sterea Ellada", "EL64"),
    ("Central Greece", "EL64"),
    ("Πελοπόννησος", "EL65"),
    ("Peloponnisos", "EL65"),
    ("Peloponnese", "EL65"),
];

static OCCUPATION_PAIRS: Pairs = &[
    ("Σύνολο", "TOT"),
    ("Σύνολο επαγγελμάτων", "TOT"),
    ("Total", "TOT"),
    ("All occupations", "TOT"),
    ("Ένοπλες δυνάμεις", "OC0"),
    ("Armed forces", "OC0"),
    ("Ανώτερα διευθυντικά και διοικητικά στελέχη", "OC1"),
    ("Managers", "OC1"),
    ("Επαγγελματίες", "OC2"),
    ("Professionals", "OC2"),
    ("Τεχνικοί και ασκούντες συναφή επαγγέλματα", "OC3"),
    ("Technicians and associate professionals", "OC3"),
    ("Υπάλληλοι γραφείου", "OC4"),
    ("Clerical support workers", "OC4"),
    ("Απασχολούμενοι στην παροχή υπηρεσιών και πωλητές", "OC5"),
    ("Service and sales workers", "OC5"),
    ("Ειδικευμένοι γεωργοί, κτηνοτρόφοι, δασοκόμοι και αλιείς", "OC6"),
    ("Skilled agricultural, forestry and fishery workers", "OC6"),
    ("Ειδικευμένοι τεχνίτες και ασκούντες συναφή επαγγέλματα", "OC7"),
    ("Craft and related trades workers", "OC7"),
    ("Χειριστές βιομηχανικών εγκαταστάσεων, μηχανημάτων και εξοπλισμού", "OC8"),
    ("Plant and machine operators and assemblers", "OC8"),
    ("Ανειδίκευτοι εργάτες, χειρώνακτες και μικροεπαγγελματίες", "OC9"),
    ("Elementary occupations", "OC9"),
];

static STATUS_PAIRS: Pairs = &[
    ("Σύνολο απασχολουμένων", "TOT"),
    ("Σύνολο", "TOT"),
    ("Total employed", "TOT"),
    ("Total", "TOT"),
    ("Εργοδότες", "EMRS"),
    ("Employers", "EMRS"),
    ("Αυτοαπασχολούμενοι", "OWN"),
    ("Αυτοαπασχολούμενοι χωρίς προσωπικό", "OWN"),
    ("Own-account workers", "OWN"),
    ("Μισθωτοί", "SAL"),
    ("Employees", "SAL"),
    ("Συμβοηθούντα μέλη", "FAM"),
    ("Συμβοηθούντα και μη αμειβόμενα μέλη", "FAM"),
    ("Contributing family workers", "FAM"),
    ("Unpaid family workers", "FAM"),
];

static WORKTIME_PAIRS: Pairs = &[
    ("Σύνολο", "T"),
    ("Total", "T"),
    ("Πλήρης απασχόληση", "FT"),
    ("Full-time", "FT"),
    ("Μερική απασχόληση", "PT"),
    ("Part-time", "PT"),
];

static INDICATOR_PAIRS: Pairs = &[
    ("Πληθυσμός", "POP"),
    ("Πληθυσμός ηλικίας 15+", "POP"),
    ("Population", "POP"),
    ("Εργατικό δυναμικό", "LF"),
    ("Labour force", "LF"),
    ("Απασχολούμενοι", "EMP"),
    ("Employed", "EMP"),
    ("Employed persons", "EMP"),
    ("Άνεργοι", "UNE"),
    ("Unemployed", "UNE"),
    ("Unemployed persons", "UNE"),
    ("Οικονομικά μη ενεργοί", "INAC"),
    ("Μη ενεργοί", "INAC"),
    ("Inactive", "INAC"),
    ("Economically inactive", "INAC"),
];

static MEASURE_PAIRS: Pairs = &[
    ("Άδειες", "PERM"),
    ("Αριθμός αδειών", "PERM"),
    ("Permits", "PERM"),
    ("Building permits", "PERM"),
    ("Επιφάνεια", "SURF"),
    ("Surface", "SURF"),
    ("Surface area", "SURF"),
    ("Όγκος", "VOL"),
    ("Volume", "VOL"),
];

fn build(pairs: Pairs) -> HashMap<String, &'static str> {
    let mut map = HashMap::with_capacity(pairs.len());
    for (label, code) in pairs {
        map.insert(normalize_label(label), *code);
    }
    map
}

static SEX: Lazy<HashMap<String, &'static str>> = Lazy::new(|| build(SEX_PAIRS));
static AGE: Lazy<HashMap<String, &'static str>> = Lazy::new(|| build(AGE_PAIRS));
static REGION: Lazy<HashMap<String, &'static str>> = Lazy::new(|| build(REGION_PAIRS));
static OCCUPATION: Lazy<HashMap<String, &'static str>> = Lazy::new(|| build(OCCUPATION_PAIRS));
static STATUS: Lazy<HashMap<String, &'static str>> = Lazy::new(|| build(STATUS_PAIRS));
static WORKTIME: Lazy<HashMap<String, &'static str>> = Lazy::new(|| build(WORKTIME_PAIRS));
static INDICATOR: Lazy<HashMap<String, &'static str>> = Lazy::new(|| build(INDICATOR_PAIRS));
static MEASURE: Lazy<HashMap<String, &'static str>> = Lazy::new(|| build(MEASURE_PAIRS));

fn table(dim: Dimension) -> Option<&'static HashMap<String, &'static str>> {
    match dim {
        Dimension::Time => None,
        Dimension::Sex => Some(&SEX),
        Dimension::AgeBand => Some(&AGE),
        Dimension::Region => Some(&REGION),
        Dimension::Occupation => Some(&OCCUPATION),
        Dimension::Status => Some(&STATUS),
        Dimension::WorkTime => Some(&WORKTIME),
        Dimension::Indicator => Some(&INDICATOR),
        Dimension::Measure => Some(&MEASURE),
    }
}

static FOOTNOTE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\s*\*+|\s*\(?\d{1,2}\))\s*$").expect("footnote regex"));
static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));
static HYPHEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*-\s*").expect("hyphen regex"));

/// Canonical form used for dictionary lookup: footnote markers stripped,
/// whitespace collapsed, hyphens tightened, lowercase with Greek accents and
/// the final sigma folded away.
pub fn normalize_label(raw: &str) -> String {
    let stripped = FOOTNOTE_RE.replace(raw.trim(), "");
    let collapsed = WS_RE.replace_all(stripped.as_ref(), " ");
    let tightened = HYPHEN_RE.replace_all(collapsed.as_ref(), "-");
    tightened
        .trim()
        .chars()
        .flat_map(|ch| ch.to_lowercase())
        .map(fold_greek)
        .collect()
}

fn fold_greek(ch: char) -> char {
    match ch {
        'ά' => 'α',
        'έ' => 'ε',
        'ή' => 'η',
        'ί' | 'ϊ' | 'ΐ' => 'ι',
        'ό' => 'ο',
        'ύ' | 'ϋ' | 'ΰ' => 'υ',
        'ώ' => 'ω',
        'ς' => 'σ',
        other => other,
    }
}

pub fn code_for(dim: Dimension, raw: &str) -> Option<&'static str> {
    let key = normalize_label(raw);
    if key.is_empty() {
        return None;
    }
    table(dim)?.get(key.as_str()).copied()
}

pub fn require_code(dim: Dimension, raw: &str) -> Result<&'static str, EtlError> {
    code_for(dim, raw).ok_or_else(|| EtlError::UnknownLabel {
        dimension: dim,
        label: raw.trim().to_string(),
    })
}

/// Codes a stub label for the given dimension. Time stubs are parsed, not
/// looked up, since every period label is distinct.
pub fn stub_code(dim: Dimension, raw: &str) -> Option<String> {
    match dim {
        Dimension::Time => time_code(raw),
        _ => code_for(dim, raw).map(|code| code.to_string()),
    }
}

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(19|20)\d{2}").expect("year regex"));
static QUARTER_LATIN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"q\s*([1-4])|([1-4])(st|nd|rd|th)? quarter").expect("quarter regex"));
static QUARTER_GREEK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([αβγδ])\s*[΄'´]?\s*τριμηνο|([1-4])ο τριμηνο").expect("quarter regex"));

/// Parses period labels like `2019`, `Q2 2019`, `Β΄ τρίμηνο 2019` into
/// `2019` / `2019-Q2` codes.
pub fn time_code(raw: &str) -> Option<String> {
    let folded = normalize_label(raw);
    let year = YEAR_RE.find_iter(&folded).last()?.as_str();

    if let Some(caps) = QUARTER_LATIN_RE.captures(&folded) {
        let digit = caps.get(1).or_else(|| caps.get(2))?.as_str();
        return Some(format!("{}-Q{}", year, digit));
    }
    if let Some(caps) = QUARTER_GREEK_RE.captures(&folded) {
        let quarter = match caps.get(1) {
            Some(letter) => match letter.as_str() {
                "α" => 1,
                "β" => 2,
                "γ" => 3,
                _ => 4,
            },
            None => caps.get(2)?.as_str().parse().ok()?,
        };
        return Some(format!("{}-Q{}", year, quarter));
    }
    Some(year.to_string())
}
