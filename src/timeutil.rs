//! Aritmetica pura su date e fasce orarie. Nessuna dipendenza dal dominio.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Timelike};

/// Fascia oraria nello stesso giorno, `fine` strettamente dopo `inizio`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub inizio: NaiveTime,
    pub fine: NaiveTime,
}

impl TimeRange {
    pub fn new(inizio: NaiveTime, fine: NaiveTime) -> Result<Self, String> {
        if fine <= inizio {
            return Err("end must be strictly after start".to_string());
        }
        Ok(Self { inizio, fine })
    }

    pub fn duration_minutes(&self) -> i64 {
        i64::from(minutes_from_midnight(self.fine)) - i64::from(minutes_from_midnight(self.inizio))
    }

    pub fn ore(&self) -> f64 {
        self.duration_minutes() as f64 / 60.0
    }

    /// Sovrapposizione a intervalli semiaperti: `not (a.fine <= b.inizio or b.fine <= a.inizio)`.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        !(self.fine <= other.inizio || other.fine <= self.inizio)
    }
}

pub fn minutes_from_midnight(t: NaiveTime) -> u32 {
    t.num_seconds_from_midnight() / 60
}

/// Giorno della settimana 1–7, lunedì = 1.
pub fn weekday_number(date: NaiveDate) -> u8 {
    date.weekday().number_from_monday() as u8
}

pub fn is_weekend(giorno: u8) -> bool {
    giorno == 6 || giorno == 7
}

/// Lunedì della settimana che contiene `date`.
pub fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Date incluse tra `start` e `end`; vuoto se `end < start`.
pub fn giorni_inclusi(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut out = Vec::new();
    let mut current = start;
    while current <= end {
        out.push(current);
        match current.succ_opt() {
            Some(next) => current = next,
            None => break,
        }
    }
    out
}

/// Nome italiano del giorno 1–7; vuoto fuori intervallo.
pub fn nome_giorno(giorno: u8) -> &'static str {
    match giorno {
        1 => "lunedì",
        2 => "martedì",
        3 => "mercoledì",
        4 => "giovedì",
        5 => "venerdì",
        6 => "sabato",
        7 => "domenica",
        _ => "",
    }
}

/// Data compatta per i testi generati, es. "03/02".
pub fn data_breve(date: NaiveDate) -> String {
    format!("{:02}/{:02}", date.day(), date.month())
}
