use super::*;
use time::macros::datetime;

fn team(name: &str) -> Team {
    Team {
        id: Uuid::new_v4(),
        name: name.to_owned(),
        short_name: None,
        logo_url: None,
        created_at: datetime!(2026-03-01 00:00 UTC),
    }
}

fn award(team: &Team, kind: MedalKind) -> Medal {
    Medal {
        id: Uuid::new_v4(),
        sport_id: Uuid::nil(),
        team_id: team.id,
        medal: kind.as_str().to_owned(),
        awarded_at: datetime!(2026-05-10 12:00 UTC),
    }
}

#[test]
fn tally_includes_teams_without_medals() {
    let teams = vec![team("Arts"), team("Science")];
    let medals = vec![award(&teams[1], MedalKind::Bronze)];
    let rows = compute_tally(&teams, &medals);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].team_name, "Science");
    assert_eq!(rows[1].team_name, "Arts");
    assert_eq!(rows[1].counts, MedalCounts::default());
}

#[test]
fn gold_outranks_any_number_of_silver() {
    let teams = vec![team("Arts"), team("Science")];
    let mut medals = vec![award(&teams[0], MedalKind::Gold)];
    for _ in 0..5 {
        medals.push(award(&teams[1], MedalKind::Silver));
    }
    let rows = compute_tally(&teams, &medals);
    assert_eq!(rows[0].team_name, "Arts");
    assert_eq!(rows[0].rank, 1);
    assert_eq!(rows[1].rank, 2);
    assert_eq!(rows[1].counts.total, 5);
}

#[test]
fn ties_share_rank_and_skip_next() {
    let teams = vec![team("Delta"), team("Alpha"), team("Charlie"), team("Bravo")];
    let medals = vec![
        award(&teams[0], MedalKind::Gold),
        award(&teams[0], MedalKind::Gold),
        award(&teams[1], MedalKind::Gold),
        award(&teams[2], MedalKind::Gold),
    ];
    let rows = compute_tally(&teams, &medals);
    let ranked: Vec<(&str, u32)> = rows.iter().map(|r| (r.team_name.as_str(), r.rank)).collect();
    assert_eq!(ranked, vec![("Delta", 1), ("Alpha", 2), ("Charlie", 2), ("Bravo", 4)]);
}

#[test]
fn unknown_medal_values_are_ignored() {
    let teams = vec![team("Arts")];
    let mut bogus = award(&teams[0], MedalKind::Gold);
    bogus.medal = "platinum".into();
    let rows = compute_tally(&teams, &[bogus]);
    assert_eq!(rows[0].counts.total, 0);
}

#[test]
fn counts_for_team_only_count_that_team() {
    let arts = team("Arts");
    let science = team("Science");
    let medals = vec![
        award(&arts, MedalKind::Gold),
        award(&arts, MedalKind::Bronze),
        award(&science, MedalKind::Gold),
    ];
    let counts = MedalCounts::for_team(arts.id, &medals);
    assert_eq!(counts, MedalCounts { gold: 1, silver: 0, bronze: 1, total: 2 });
}

#[test]
fn tally_row_serializes_flat_counts() {
    let teams = vec![team("Arts")];
    let rows = compute_tally(&teams, &[award(&teams[0], MedalKind::Silver)]);
    let json = serde_json::to_value(&rows[0]).unwrap();
    assert_eq!(json["rank"], 1);
    assert_eq!(json["silver"], 1);
    assert_eq!(json["total"], 1);
}

#[test]
fn draft_validation() {
    let err = MedalDraft::default().validate().unwrap_err();
    assert_eq!(err.field, "sport_id");

    let draft = MedalDraft { sport_id: Some(Uuid::nil()), team_id: Some(Uuid::nil()), medal: Some("tin".into()) };
    assert_eq!(draft.validate().unwrap_err().field, "medal");

    let draft = MedalDraft { sport_id: Some(Uuid::nil()), team_id: Some(Uuid::nil()), medal: Some("Gold".into()) };
    assert_eq!(draft.validate().unwrap().medal, MedalKind::Gold);
}

#[test]
fn patch_changes_medal_kind() {
    let arts = team("Arts");
    let stored = award(&arts, MedalKind::Bronze);
    let patch = MedalPatch { medal: Some("silver".into()), ..MedalPatch::default() };
    let fields = stored.apply(&patch).unwrap();
    assert_eq!(fields.medal, MedalKind::Silver);
    assert_eq!(fields.team_id, arts.id);
}
