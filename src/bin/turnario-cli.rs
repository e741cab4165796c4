#![forbid(unsafe_code)]
use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use turnario::{
    assign_riposi_automatici, check_slot_availability, generate_week_shifts, io,
    model::{TeamId, WorkerId},
    proposal::{valida_da_sorgente, FileDraftSource},
    restdays::{RestAssignmentResult, RestQuota},
    storage::{JsonStorage, Storage},
    GenerationResult, RequestKind,
};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI minimalista del motore turni (senza base di dati)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Attiva i log (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// File JSON dello snapshot di contesto
    #[arg(long, global = true, default_value = "snapshot.json")]
    snapshot: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generare i turni della settimana dello snapshot
    Generate {
        /// Export JSON del risultato completo (opzionale)
        #[arg(long)]
        out_json: Option<String>,
        /// Export CSV dei turni generati (opzionale)
        #[arg(long)]
        out_csv: Option<String>,
    },

    /// Assegnare i riposi settimanali a un collaboratore
    Riposi {
        #[arg(long)]
        collaboratore: String,
        /// Giornate intere richieste
        #[arg(long, conflicts_with_all = ["mezze", "ore"])]
        giorni: Option<u32>,
        /// Mezze giornate richieste
        #[arg(long, conflicts_with = "ore")]
        mezze: Option<u32>,
        /// Ore di riposo richieste (convertite in giornate e mezze giornate)
        #[arg(long)]
        ore: Option<f64>,
    },

    /// Verificare se una richiesta di assenza lascia coperto il nucleo
    CheckSlot {
        #[arg(long)]
        nucleo: String,
        /// Data ISO (YYYY-MM-DD)
        #[arg(long)]
        data: String,
        #[arg(long)]
        collaboratore: String,
        /// riposo | ferie | permesso | indisponibilita
        #[arg(long, default_value = "riposo")]
        tipo: String,
    },

    /// Importare collaboratori da un CSV nello snapshot
    ImportCollaboratori {
        #[arg(long)]
        csv: String,
    },

    /// Validare una bozza esterna (JSON) contro lo snapshot
    ValidaBozza {
        #[arg(long)]
        bozza: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let storage = JsonStorage::open(&cli.snapshot)?;

    let code = match cli.cmd {
        Commands::Generate { out_json, out_csv } => {
            // Guasto a monte = risultato fallito con un solo avviso, mai un retry.
            let result = match storage.load() {
                Ok(ctx) => generate_week_shifts(&ctx)?,
                Err(e) => GenerationResult::failed(format!("snapshot non caricabile: {e:#}")),
            };

            if let Some(path) = &out_json {
                io::export_generation_json(path, &result)?;
            }
            if let Some(path) = &out_csv {
                io::export_turni_csv(path, &result.turni)?;
            }

            // stampa compatta
            for t in &result.turni {
                let selezionati = t
                    .selezionati()
                    .map(|c| c.collaboratore_id.as_str())
                    .collect::<Vec<_>>()
                    .join(",");
                println!(
                    "{} | {} {}→{} | {}/{} | {} | {}",
                    t.nucleo_id.as_str(),
                    t.data,
                    t.ora_inizio.format("%H:%M"),
                    t.ora_fine.format("%H:%M"),
                    t.selezionati().count(),
                    t.num_collaboratori_richiesti,
                    t.copertura.descrizione(),
                    if selezionati.is_empty() {
                        "-"
                    } else {
                        selezionati.as_str()
                    }
                );
            }
            for w in &result.warnings {
                eprintln!("[{:?}] {}", w.severita, w.messaggio);
            }
            println!(
                "copertura: {}/{} ({:.0}%), equità {:.2}, confidenza media {:.2}",
                result.coverage_stats.coperti,
                result.coverage_stats.totale,
                result.coverage_stats.percentuale,
                result.workload_distribution.equita_score,
                result.confidence_average
            );

            if result.coverage_stats.scoperti > 0 || result.turni.is_empty() {
                // Codice 2 = settimana degradata
                2
            } else {
                0
            }
        }
        Commands::Riposi {
            collaboratore,
            giorni,
            mezze,
            ore,
        } => {
            let quota = match (giorni, mezze, ore) {
                (Some(q), _, _) => RestQuota::GiorniInteri { quantita: q },
                (_, Some(q), _) => RestQuota::MezzeGiornate { quantita: q },
                (_, _, Some(q)) => RestQuota::Ore { quantita: q },
                _ => bail!("indicare --giorni, --mezze oppure --ore"),
            };

            let result = match storage.load() {
                Ok(ctx) => {
                    assign_riposi_automatici(&ctx, &WorkerId::new(&collaboratore), quota)?
                }
                Err(e) => {
                    RestAssignmentResult::failed(format!("snapshot non caricabile: {e:#}"))
                }
            };

            for r in &result.riposi {
                println!(
                    "{} {} | {} | confidenza {:.2}",
                    r.data,
                    r.giorno_settimana,
                    r.tipo.descrizione(),
                    r.confidenza
                );
            }
            for w in &result.warnings {
                eprintln!("[{:?}] {}", w.severita, w.messaggio);
            }
            if !result.reasoning.is_empty() {
                println!("{}", result.reasoning);
            }
            if result.success {
                0
            } else {
                2
            }
        }
        Commands::CheckSlot {
            nucleo,
            data,
            collaboratore,
            tipo,
        } => {
            let ctx = storage.load()?;
            let data: NaiveDate = data.parse()?;
            let tipo = match tipo.as_str() {
                "riposo" => RequestKind::Riposo,
                "ferie" => RequestKind::Ferie,
                "permesso" => RequestKind::Permesso,
                "indisponibilita" => RequestKind::Indisponibilita,
                altro => bail!("tipo di richiesta sconosciuto: {altro}"),
            };

            let esito = check_slot_availability(
                &ctx,
                &TeamId::new(&nucleo),
                data,
                &WorkerId::new(&collaboratore),
                tipo,
            )?;

            if esito.disponibile {
                println!("OK: richiesta concedibile");
                if let Some(motivo) = &esito.motivo {
                    println!("({motivo})");
                }
                0
            } else {
                eprintln!(
                    "BLOCCATA: {}",
                    esito.motivo.as_deref().unwrap_or("copertura insufficiente")
                );
                if let Some(d) = &esito.dettagli {
                    eprintln!(
                        "copertura: minima {}, attuale {}, se approvato {}",
                        d.copertura_minima, d.copertura_attuale, d.copertura_se_approvato
                    );
                    if !d.altri_disponibili.is_empty() {
                        let altri = d
                            .altri_disponibili
                            .iter()
                            .map(|w| w.as_str())
                            .collect::<Vec<_>>()
                            .join(", ");
                        eprintln!("possibili coperture (decisione umana): {altri}");
                    }
                }
                2
            }
        }
        Commands::ImportCollaboratori { csv } => {
            let mut ctx = storage.load()?;
            let importati = io::import_collaboratori_csv(csv)?;
            let n = importati.len();
            for w in importati {
                // un id già presente aggiorna il collaboratore esistente
                match ctx.collaboratori.iter_mut().find(|c| c.id == w.id) {
                    Some(esistente) => *esistente = w,
                    None => ctx.collaboratori.push(w),
                }
            }
            ctx.validate()?;
            storage.save(&ctx)?;
            println!("importati {n} collaboratori");
            0
        }
        Commands::ValidaBozza { bozza } => {
            let ctx = storage.load()?;
            let source = FileDraftSource::new(bozza);
            let esito = valida_da_sorgente(&ctx, &source)?;

            println!(
                "turni: {} accettati, {} respinti | riposi: {} accettati, {} respinti",
                esito.turni_accettati.len(),
                esito.turni_respinti.len(),
                esito.riposi_accettati.len(),
                esito.riposi_respinti.len()
            );
            for r in &esito.turni_respinti {
                eprintln!(
                    "turno respinto {} {} {}: {}",
                    r.turno.collaboratore_id.as_str(),
                    r.turno.data,
                    r.turno.ora_inizio.format("%H:%M"),
                    r.ragioni.join("; ")
                );
            }
            for r in &esito.riposi_respinti {
                eprintln!(
                    "riposo respinto {} {}: {}",
                    r.riposo.collaboratore_id.as_str(),
                    r.riposo.data,
                    r.ragione
                );
            }
            for w in &esito.warnings {
                eprintln!("[{:?}] {}", w.severita, w.messaggio);
            }
            if esito.all_accepted() {
                0
            } else {
                2
            }
        }
    };

    std::process::exit(code);
}
