#![forbid(unsafe_code)]
use chrono::{Duration, NaiveDate, NaiveTime};
use turnario::{
    detect_conflicts, find_available_collaborators, validate_assignment,
    model::{
        ApprovedLeave, ConstraintRule, ConstraintTemplate, ExistingShiftAssignment, LeaveKind,
        Preference, PreferenceLevel, Severity, Team, TeamId, Worker, WorkerId,
    },
    ConflictEntity, ContextSnapshot, TimeRange,
};

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
}

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
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

fn shift(id: &str, who: &str, data: NaiveDate, inizio: NaiveTime, fine: NaiveTime) -> ExistingShiftAssignment {
    ExistingShiftAssignment::new(id, WorkerId::new(who), data, inizio, fine).unwrap()
}

fn cap(max_ore: f64, severita: Severity) -> ConstraintTemplate {
    ConstraintTemplate {
        id: "cap".to_string(),
        nome: "Massimo ore settimanali".to_string(),
        severita,
        regola: ConstraintRule::WeeklyHourCap { max_ore },
        nucleo_id: None,
    }
}

fn riposo_minimo(ore: f64) -> ConstraintTemplate {
    ConstraintTemplate {
        id: "riposo".to_string(),
        nome: "Riposo minimo".to_string(),
        severita: Severity::Hard,
        regola: ConstraintRule::MinimumRest { ore },
        nucleo_id: None,
    }
}

/// 36 ore già assegnate nella settimana più 8 proposte sfondano il tetto
/// delle 40; la violazione HARD blocca.
#[test]
fn weekly_cap_hard_violation_blocks() {
    let mut ctx = snapshot();
    ctx.collaboratori = vec![worker("w1", "Anna", &[])];
    ctx.vincoli = vec![cap(40.0, Severity::Hard)];
    for (i, giorno) in (0..4).enumerate() {
        ctx.turni_esistenti.push(shift(
            &format!("t{i}"),
            "w1",
            monday() + Duration::days(giorno),
            t(9, 0),
            t(18, 0),
        ));
    }

    let range = TimeRange::new(t(9, 0), t(17, 0)).unwrap();
    let outcome =
        validate_assignment(&ctx, &WorkerId::new("w1"), monday() + Duration::days(4), &range)
            .unwrap();

    assert!(outcome.has_hard_violation());
    assert_eq!(outcome.violazioni.len(), 1);
    assert!(outcome.violazioni[0].descrizione.contains("44.0"));
}

/// Lo stesso vincolo in versione SOFT annota e non blocca.
#[test]
fn weekly_cap_soft_violation_only_warns() {
    let mut ctx = snapshot();
    ctx.collaboratori = vec![worker("w1", "Anna", &[])];
    ctx.vincoli = vec![cap(40.0, Severity::Soft)];
    for giorno in 0..5 {
        ctx.turni_esistenti.push(shift(
            &format!("t{giorno}"),
            "w1",
            monday() + Duration::days(giorno),
            t(9, 0),
            t(18, 0),
        ));
    }

    let range = TimeRange::new(t(9, 0), t(13, 0)).unwrap();
    let outcome =
        validate_assignment(&ctx, &WorkerId::new("w1"), monday() + Duration::days(5), &range)
            .unwrap();

    assert!(!outcome.has_hard_violation());
    assert_eq!(outcome.soft_violations().count(), 1);
}

/// I turni annullati e quelli fuori dalla settimana di lunedì non contano.
#[test]
fn weekly_cap_ignores_cancelled_and_out_of_week() {
    let mut ctx = snapshot();
    ctx.collaboratori = vec![worker("w1", "Anna", &[])];
    ctx.vincoli = vec![cap(40.0, Severity::Hard)];

    let mut annullato = shift("a", "w1", monday(), t(9, 0), t(18, 0));
    annullato.stato = turnario::model::AssignmentStatus::Annullato;
    ctx.turni_esistenti.push(annullato);
    // domenica della settimana precedente
    ctx.turni_esistenti
        .push(shift("b", "w1", monday() - Duration::days(1), t(9, 0), t(18, 0)));

    let range = TimeRange::new(t(9, 0), t(18, 0)).unwrap();
    let outcome = validate_assignment(&ctx, &WorkerId::new("w1"), monday(), &range).unwrap();
    assert!(outcome.violazioni.is_empty());
}

/// Turno finito ieri alle 23:00, inizio proposto alle 08:00: nove ore di
/// riposo contro un minimo di undici.
#[test]
fn minimum_rest_counts_overnight_minutes() {
    let mut ctx = snapshot();
    ctx.collaboratori = vec![worker("w1", "Anna", &[])];
    ctx.vincoli = vec![riposo_minimo(11.0)];
    ctx.turni_esistenti = vec![shift("t0", "w1", monday(), t(15, 0), t(23, 0))];

    let range = TimeRange::new(t(8, 0), t(16, 0)).unwrap();
    let outcome =
        validate_assignment(&ctx, &WorkerId::new("w1"), monday() + Duration::days(1), &range)
            .unwrap();

    assert!(outcome.has_hard_violation());
    assert!(outcome.violazioni[0].descrizione.contains("9.0"));
}

/// Undici ore esatte soddisfano il minimo; nessun turno ieri idem.
#[test]
fn minimum_rest_boundary_and_empty_yesterday() {
    let mut ctx = snapshot();
    ctx.collaboratori = vec![worker("w1", "Anna", &[])];
    ctx.vincoli = vec![riposo_minimo(11.0)];
    ctx.turni_esistenti = vec![shift("t0", "w1", monday(), t(14, 0), t(22, 0))];

    let range = TimeRange::new(t(9, 0), t(17, 0)).unwrap();
    let martedi = monday() + Duration::days(1);
    let outcome = validate_assignment(&ctx, &WorkerId::new("w1"), martedi, &range).unwrap();
    assert!(outcome.violazioni.is_empty());

    let giovedi = monday() + Duration::days(3);
    let outcome = validate_assignment(&ctx, &WorkerId::new("w1"), giovedi, &range).unwrap();
    assert!(outcome.violazioni.is_empty());
}

/// La scansione conflitti accumula turni sovrapposti, preferenze con fascia
/// e assenze senza fermarsi al primo esito.
#[test]
fn conflicts_accumulate_across_kinds() {
    let mut ctx = snapshot();
    ctx.collaboratori = vec![
        worker("w1", "Anna", &["bar"]),
        worker("w2", "Bruno", &["bar"]),
        worker("w3", "Carla", &["bar"]),
    ];
    ctx.nuclei = vec![team("bar", "Bar", 1, &["w1", "w2", "w3"])];
    ctx.turni_esistenti = vec![shift("t0", "w1", monday(), t(10, 0), t(14, 0))];
    ctx.preferenze = vec![Preference {
        collaboratore_id: WorkerId::new("w2"),
        data: monday(),
        ora_inizio: Some(t(9, 0)),
        ora_fine: Some(t(12, 0)),
        tipo: PreferenceLevel::Disponibile,
    }];
    ctx.richieste_approvate = vec![ApprovedLeave::new(
        WorkerId::new("w3"),
        monday(),
        monday(),
        LeaveKind::Ferie,
    )
    .unwrap()];

    let range = TimeRange::new(t(9, 0), t(13, 0)).unwrap();
    let report = detect_conflicts(&ctx, &TeamId::new("bar"), monday(), &range, None).unwrap();

    assert!(report.has_conflicts());
    assert_eq!(report.conflitti.len(), 3);
    let entita: Vec<ConflictEntity> = report.conflitti.iter().map(|c| c.entita).collect();
    assert!(entita.contains(&ConflictEntity::Turno));
    assert!(entita.contains(&ConflictEntity::Preferenza));
    assert!(entita.contains(&ConflictEntity::Assenza));
}

/// Intervalli semiaperti: un turno che finisce quando l'altro comincia non
/// è un conflitto; il collaboratore escluso non viene scandito.
#[test]
fn half_open_overlap_and_exclusion() {
    let mut ctx = snapshot();
    ctx.collaboratori = vec![worker("w1", "Anna", &["bar"]), worker("w2", "Bruno", &["bar"])];
    ctx.nuclei = vec![team("bar", "Bar", 1, &["w1", "w2"])];
    ctx.turni_esistenti = vec![
        shift("t0", "w1", monday(), t(6, 0), t(9, 0)),
        shift("t1", "w2", monday(), t(10, 0), t(12, 0)),
    ];

    let range = TimeRange::new(t(9, 0), t(11, 0)).unwrap();

    let report = detect_conflicts(&ctx, &TeamId::new("bar"), monday(), &range, None).unwrap();
    assert_eq!(report.conflitti.len(), 1);
    assert_eq!(report.conflitti[0].collaboratore_id, WorkerId::new("w2"));

    let escluso = WorkerId::new("w2");
    let report =
        detect_conflicts(&ctx, &TeamId::new("bar"), monday(), &range, Some(&escluso)).unwrap();
    assert!(!report.has_conflicts());
}

/// La graduatoria dei liberi segue il punteggio di preferenza 10-90.
#[test]
fn available_collaborators_sorted_by_preference_score() {
    let mut ctx = snapshot();
    ctx.collaboratori = vec![
        worker("w1", "Anna", &["bar"]),
        worker("w2", "Bruno", &["bar"]),
        worker("w3", "Carla", &["bar"]),
        worker("w4", "Dario", &["bar"]),
    ];
    ctx.nuclei = vec![team("bar", "Bar", 1, &["w1", "w2", "w3", "w4"])];
    ctx.preferenze = vec![
        Preference {
            collaboratore_id: WorkerId::new("w2"),
            data: monday(),
            ora_inizio: None,
            ora_fine: None,
            tipo: PreferenceLevel::Preferita,
        },
        Preference {
            collaboratore_id: WorkerId::new("w3"),
            data: monday(),
            ora_inizio: None,
            ora_fine: None,
            tipo: PreferenceLevel::NonDisponibile,
        },
        Preference {
            collaboratore_id: WorkerId::new("w4"),
            data: monday(),
            ora_inizio: None,
            ora_fine: None,
            tipo: PreferenceLevel::Disponibile,
        },
    ];

    let range = TimeRange::new(t(9, 0), t(18, 0)).unwrap();
    let liberi =
        find_available_collaborators(&ctx, &TeamId::new("bar"), monday(), &range).unwrap();

    let punteggi: Vec<u32> = liberi.iter().map(|r| r.punteggio).collect();
    assert_eq!(punteggi, vec![90, 70, 50, 10]);
    assert_eq!(liberi[0].collaboratore_id, WorkerId::new("w2"));
    assert_eq!(liberi[3].collaboratore_id, WorkerId::new("w3"));
}
