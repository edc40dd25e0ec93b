//! Localization lookup consumed by every user-facing label and message.

use std::str::FromStr;

use thiserror::Error;

pub trait Translate: Send + Sync {
    /// Looks up `key` and substitutes `{{name}}` placeholders from `params`.
    fn translate(&self, key: &str, params: &[(&str, String)]) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    EnUs,
    FrCa,
}

impl Locale {
    pub fn tag(self) -> &'static str {
        match self {
            Self::EnUs => "en-US",
            Self::FrCa => "fr-CA",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Self::EnUs => Self::FrCa,
            Self::FrCa => Self::EnUs,
        }
    }
}

#[derive(Debug, Error)]
#[error("unsupported locale '{0}'")]
pub struct UnknownLocale(pub String);

impl FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase().replace('_', "-");
        match lower.as_str() {
            "en" | "en-us" => Ok(Self::EnUs),
            "fr" | "fr-ca" => Ok(Self::FrCa),
            _ => Err(UnknownLocale(s.to_string())),
        }
    }
}

const EN_US: &[(&str, &str)] = &[
    ("Validation.MidiFileNameRequired", "A MIDI file name is required"),
    ("Validation.TempoMin", "Tempo must be at least {{minTempo}}"),
    ("Validation.TempoMax", "Tempo must be at most {{maxTempo}}"),
    ("Validation.MeasureRequired", "A measure number is required"),
    ("Validation.MeasureMin", "Measure must be at least 1"),
    ("Validation.PageRangeRequired", "A page number is required"),
    ("Validation.PageRange", "Page number must be at least 1"),
    ("Validation.Invalid", "This value is invalid"),
    ("Submit.NoFile", "Select a music sheet before converting"),
    ("Submit.Invalid", "Fix the highlighted fields before converting"),
    ("Submit.InFlight", "A conversion is already in progress"),
    ("Status.Converting", "Converting {{fileName}}..."),
    ("Status.Saved", "MIDI file saved to {{path}}"),
    ("Status.Failed", "Conversion failed: {{message}}"),
    ("Reset", "Reset"),
    ("ConvertNow", "Convert now"),
];

const FR_CA: &[(&str, &str)] = &[
    ("Validation.MidiFileNameRequired", "Le nom du fichier MIDI est requis"),
    ("Validation.TempoMin", "Le tempo doit être d'au moins {{minTempo}}"),
    ("Validation.TempoMax", "Le tempo doit être d'au plus {{maxTempo}}"),
    ("Validation.MeasureRequired", "Le numéro de mesure est requis"),
    ("Validation.MeasureMin", "La mesure doit être d'au moins 1"),
    ("Validation.PageRangeRequired", "Le numéro de page est requis"),
    ("Validation.PageRange", "Le numéro de page doit être d'au moins 1"),
    ("Validation.Invalid", "Cette valeur est invalide"),
    ("Submit.NoFile", "Sélectionnez une partition avant de convertir"),
    ("Submit.Invalid", "Corrigez les champs en erreur avant de convertir"),
    ("Submit.InFlight", "Une conversion est déjà en cours"),
    ("Status.Converting", "Conversion de {{fileName}}..."),
    ("Status.Saved", "Fichier MIDI enregistré dans {{path}}"),
    ("Status.Failed", "La conversion a échoué : {{message}}"),
    ("Reset", "Réinitialiser"),
    ("ConvertNow", "Convertir"),
];

/// Built-in message tables for the two shipped locales.
#[derive(Debug, Clone, Copy, Default)]
pub struct Catalog {
    locale: Locale,
}

impl Catalog {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn set_locale(&mut self, locale: Locale) {
        self.locale = locale;
    }

    fn table(&self) -> &'static [(&'static str, &'static str)] {
        match self.locale {
            Locale::EnUs => EN_US,
            Locale::FrCa => FR_CA,
        }
    }
}

impl Translate for Catalog {
    fn translate(&self, key: &str, params: &[(&str, String)]) -> String {
        let Some((_, template)) = self.table().iter().find(|(k, _)| *k == key) else {
            return key.to_string();
        };
        interpolate(template, params)
    }
}

fn interpolate(template: &str, params: &[(&str, String)]) -> String {
    let mut out = template.to_string();
    for (name, value) in params {
        out = out.replace(&format!("{{{{{name}}}}}"), value);
    }
    out
}
