use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use csv::{ReaderBuilder, WriterBuilder};

use crate::generation::GenerationResult;
use crate::model::{GeneratedShift, TeamId, Worker, WorkerId};

/// Import di collaboratori da CSV: header `id,nome,ore_settimanali,nuclei,nucleo_primario`.
///
/// La colonna `id` può restare vuota: in quel caso l'importatore ne conia uno.
/// I nuclei sono separati da `;`.
pub fn import_collaboratori_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Worker>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let id_raw = rec.get(0).context("missing id")?.trim();
        let nome = rec.get(1).context("missing nome")?.trim();
        let ore_raw = rec.get(2).context("missing ore_settimanali")?.trim();
        if nome.is_empty() {
            bail!("invalid worker row (empty nome)");
        }

        let id = if id_raw.is_empty() {
            WorkerId::random()
        } else {
            WorkerId::new(id_raw)
        };
        let ore: f64 = ore_raw
            .parse()
            .with_context(|| format!("invalid ore_settimanali for {nome}"))?;
        if !ore.is_finite() || ore < 0.0 {
            bail!("negative or non-finite ore_settimanali for {nome}");
        }

        let mut worker = Worker::new(id, nome, ore);
        if let Some(nuclei) = rec.get(3) {
            worker.nuclei = parse_team_list(nuclei);
        }
        if let Some(primario) = rec.get(4) {
            let primario = primario.trim();
            if !primario.is_empty() {
                worker.nucleo_primario = Some(TeamId::new(primario));
            }
        }
        out.push(worker);
    }
    Ok(out)
}

fn parse_team_list(raw: &str) -> Vec<TeamId> {
    raw.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(TeamId::new)
        .collect()
}

/// Export JSON del risultato di generazione (formattato).
pub fn export_generation_json<P: AsRef<Path>>(
    path: P,
    result: &GenerationResult,
) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(result)?;
    fs::write(path, s)?;
    Ok(())
}

/// Export CSV dei turni generati:
/// header `nucleo,data,inizio,fine,richiesti,selezionati,copertura,confidenza,collaboratori`.
pub fn export_turni_csv<P: AsRef<Path>>(path: P, turni: &[GeneratedShift]) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record([
        "nucleo",
        "data",
        "inizio",
        "fine",
        "richiesti",
        "selezionati",
        "copertura",
        "confidenza",
        "collaboratori",
    ])?;

    let mut int_buf = itoa::Buffer::new();
    let mut int_buf2 = itoa::Buffer::new();
    for t in turni {
        let data = t.data.format("%Y-%m-%d").to_string();
        let inizio = t.ora_inizio.format("%H:%M").to_string();
        let fine = t.ora_fine.format("%H:%M").to_string();
        let selezionati = t.selezionati().count();
        let collaboratori = t
            .selezionati()
            .map(|c| c.collaboratore_id.as_str())
            .collect::<Vec<_>>()
            .join(";");
        let confidenza = format!("{:.2}", t.confidenza);
        w.write_record([
            t.nucleo_id.as_str(),
            data.as_str(),
            inizio.as_str(),
            fine.as_str(),
            int_buf.format(t.num_collaboratori_richiesti),
            int_buf2.format(selezionati),
            t.copertura.descrizione(),
            confidenza.as_str(),
            collaboratori.as_str(),
        ])?;
    }
    w.flush()?;
    Ok(())
}
