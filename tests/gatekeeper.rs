#![forbid(unsafe_code)]
use chrono::{Duration, NaiveDate};
use turnario::{
    check_multi_slot_availability, check_slot_availability,
    model::{ApprovedLeave, LeaveKind, Team, TeamId, Worker, WorkerId},
    ContextSnapshot, RequestKind,
};

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
}

fn snapshot() -> ContextSnapshot {
    ContextSnapshot {
        collaboratori: Vec::new(),
        nuclei: Vec::new(),
        criticita_continuative: Vec::new(),
        periodi_critici: Vec::new(),
        riposi: Vec::new(),
        preferenze: Vec::new(),
        richieste_approvate: Vec::new(),
        turni_esistenti: Vec::new(),
        pattern_storici: Vec::new(),
        vincoli: Vec::new(),
        week_start: monday(),
        week_end: monday() + Duration::days(6),
    }
}

fn worker(id: &str, nome: &str, nuclei: &[&str]) -> Worker {
    let mut w = Worker::new(WorkerId::new(id), nome, 40.0);
    w.nuclei = nuclei.iter().map(TeamId::new).collect();
    w
}

fn team(id: &str, nome: &str, minimo: u32, membri: &[&str]) -> Team {
    let mut t = Team::new(TeamId::new(id), nome, minimo);
    t.membri = membri.iter().map(WorkerId::new).collect();
    t
}

/// Con un'assenza già approvata il mercoledì, il nucleo è esattamente al
/// minimo: la richiesta di un altro membro viene bloccata e non ci sono
/// coperture alternative da suggerire.
#[test]
fn blocked_at_minimum_with_no_alternatives() {
    let mercoledi = monday() + Duration::days(2);

    let mut ctx = snapshot();
    ctx.collaboratori = vec![
        worker("x", "Anna", &["bar"]),
        worker("y", "Bruno", &["bar"]),
        worker("z", "Carla", &["bar"]),
    ];
    ctx.nuclei = vec![team("bar", "Bar", 2, &["x", "y", "z"])];
    ctx.richieste_approvate = vec![ApprovedLeave::new(
        WorkerId::new("x"),
        mercoledi,
        mercoledi,
        LeaveKind::Ferie,
    )
    .unwrap()];
    ctx.validate().unwrap();

    let esito = check_slot_availability(
        &ctx,
        &TeamId::new("bar"),
        mercoledi,
        &WorkerId::new("y"),
        RequestKind::Riposo,
    )
    .unwrap();

    assert!(!esito.disponibile);
    insta::assert_snapshot!(
        esito.motivo.clone().unwrap(),
        @"richiesta di riposo bloccata: il nucleo scenderebbe a 1 disponibili, sotto il minimo di 2"
    );
    let dettagli = esito.dettagli.unwrap();
    assert_eq!(dettagli.copertura_minima, 2);
    assert_eq!(dettagli.copertura_attuale, 2);
    assert_eq!(dettagli.copertura_se_approvato, 1);
    assert!(dettagli.altri_disponibili.is_empty());
}

/// Sopra il minimo la richiesta passa senza dettagli.
#[test]
fn approved_when_coverage_holds() {
    let mut ctx = snapshot();
    ctx.collaboratori = vec![
        worker("x", "Anna", &["bar"]),
        worker("y", "Bruno", &["bar"]),
        worker("z", "Carla", &["bar"]),
    ];
    ctx.nuclei = vec![team("bar", "Bar", 2, &["x", "y", "z"])];

    let esito = check_slot_availability(
        &ctx,
        &TeamId::new("bar"),
        monday(),
        &WorkerId::new("y"),
        RequestKind::Ferie,
    )
    .unwrap();

    assert!(esito.disponibile);
    assert!(esito.motivo.is_none());
    assert!(esito.dettagli.is_none());
}

/// Chi è già indisponibile per altro motivo non tocca la copertura:
/// approvazione banale.
#[test]
fn trivially_approved_when_already_unavailable() {
    let mut ctx = snapshot();
    ctx.collaboratori = vec![worker("x", "Anna", &["bar"]), worker("y", "Bruno", &["bar"])];
    ctx.nuclei = vec![team("bar", "Bar", 2, &["x", "y"])];
    ctx.richieste_approvate = vec![ApprovedLeave::new(
        WorkerId::new("x"),
        monday(),
        monday(),
        LeaveKind::Permesso,
    )
    .unwrap()];

    let esito = check_slot_availability(
        &ctx,
        &TeamId::new("bar"),
        monday(),
        &WorkerId::new("x"),
        RequestKind::Riposo,
    )
    .unwrap();

    assert!(esito.disponibile);
    assert!(esito.motivo.unwrap().contains("già indisponibile"));
}

/// Quando blocca, il controllo elenca i membri multi-nucleo disponibili ma
/// non riassegna nessuno.
#[test]
fn block_lists_multi_team_cover_candidates() {
    let mut ctx = snapshot();
    ctx.collaboratori = vec![
        worker("x", "Anna", &["bar"]),
        worker("z", "Carla", &["bar", "sala"]),
    ];
    ctx.nuclei = vec![
        team("bar", "Bar", 2, &["x", "z"]),
        team("sala", "Sala", 1, &["z"]),
    ];
    ctx.validate().unwrap();

    let esito = check_slot_availability(
        &ctx,
        &TeamId::new("bar"),
        monday(),
        &WorkerId::new("x"),
        RequestKind::Indisponibilita,
    )
    .unwrap();

    assert!(!esito.disponibile);
    let dettagli = esito.dettagli.unwrap();
    assert_eq!(dettagli.altri_disponibili, vec![WorkerId::new("z")]);
}

/// Su una richiesta multi-giorno basta un giorno bloccato per respingere
/// tutto; ogni giorno resta comunque riportato.
#[test]
fn multi_day_request_fails_on_single_bad_day() {
    let mercoledi = monday() + Duration::days(2);

    let mut ctx = snapshot();
    ctx.collaboratori = vec![
        worker("x", "Anna", &["bar"]),
        worker("y", "Bruno", &["bar"]),
        worker("z", "Carla", &["bar"]),
    ];
    ctx.nuclei = vec![team("bar", "Bar", 2, &["x", "y", "z"])];
    // il mercoledì Carla è assente: il nucleo scende al minimo esatto
    ctx.richieste_approvate = vec![ApprovedLeave::new(
        WorkerId::new("z"),
        mercoledi,
        mercoledi,
        LeaveKind::Ferie,
    )
    .unwrap()];

    let esito = check_multi_slot_availability(
        &ctx,
        &TeamId::new("bar"),
        monday() + Duration::days(1),
        monday() + Duration::days(3),
        &WorkerId::new("x"),
        RequestKind::Ferie,
    )
    .unwrap();

    assert!(!esito.disponibile);
    assert_eq!(esito.esiti_giorno.len(), 3);
    assert!(esito.esiti_giorno[0].esito.disponibile);
    assert!(!esito.esiti_giorno[1].esito.disponibile);
    assert!(esito.esiti_giorno[2].esito.disponibile);
    assert!(esito.motivo.unwrap().contains("04/03"));
}

/// Dopo un'approvazione la disponibilità ricalcolata non scende mai sotto
/// il minimo del nucleo.
#[test]
fn approval_never_breaks_the_minimum() {
    let mut ctx = snapshot();
    ctx.collaboratori = vec![
        worker("x", "Anna", &["bar"]),
        worker("y", "Bruno", &["bar"]),
        worker("z", "Carla", &["bar"]),
    ];
    ctx.nuclei = vec![team("bar", "Bar", 2, &["x", "y", "z"])];

    let esito = check_slot_availability(
        &ctx,
        &TeamId::new("bar"),
        monday(),
        &WorkerId::new("x"),
        RequestKind::Ferie,
    )
    .unwrap();
    assert!(esito.disponibile);

    // simuliamo la concessione e ricontrolliamo il giorno
    ctx.richieste_approvate = vec![ApprovedLeave::new(
        WorkerId::new("x"),
        monday(),
        monday(),
        LeaveKind::Ferie,
    )
    .unwrap()];
    let dopo = check_slot_availability(
        &ctx,
        &TeamId::new("bar"),
        monday(),
        &WorkerId::new("y"),
        RequestKind::Ferie,
    )
    .unwrap();

    // il prossimo richiedente trova il nucleo esattamente al minimo
    assert!(!dopo.disponibile);
    assert_eq!(dopo.dettagli.unwrap().copertura_attuale, 2);
}
