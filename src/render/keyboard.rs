//! Inline keyboard layout for each menu

use super::{Button, Keyboard};
use crate::catalog::Series;
use crate::state_machine::{Action, AddMode, CatalogSnapshot, Menu, NavigationState};

/// Build the button grid for the current menu.
///
/// `allow_edit` is whether the caller may edit library series; it only
/// controls which action rows are offered.
pub fn keyboard(state: &NavigationState, snapshot: &CatalogSnapshot, allow_edit: bool) -> Keyboard {
    let Some(series) = state.current() else {
        return Keyboard::default();
    };
    let in_library = series.in_library();

    let (navigation, menu) = match state.menu {
        Menu::Main => main_menu(state, series),
        Menu::Add => add_menu(state, in_library),
        Menu::Seasons => seasons_menu(state),
        Menu::Tags => tags_menu(state, snapshot),
        Menu::Path => (
            vec![Button::label("=== Selecting Root Folder ===")],
            snapshot
                .root_folders
                .iter()
                .map(|f| vec![Button::action(&f.path, Action::SelectPath(f.id))])
                .collect(),
        ),
        Menu::Quality => (
            vec![Button::label("=== Selecting Quality Profile ===")],
            snapshot
                .quality_profiles
                .iter()
                .map(|p| vec![Button::action(&p.name, Action::SelectQuality(p.id))])
                .collect(),
        ),
        Menu::Language => (
            vec![Button::label("=== Selecting Language Profile ===")],
            snapshot
                .language_profiles
                .iter()
                .map(|p| vec![Button::action(&p.name, Action::SelectLanguage(p.id))])
                .collect(),
        ),
        Menu::UseSeasonFolder => (
            vec![Button::label("=== Change Season Folders ===")],
            vec![vec![Button::action(
                if state.use_season_folder {
                    "❌ Single Series Folder"
                } else {
                    "✅ Use Season Folders"
                },
                Action::SelectUseSeasonFolder(!state.use_season_folder),
            )]],
        ),
    };

    Keyboard {
        navigation,
        menu,
        actions: action_rows(state.menu, in_library, allow_edit),
    }
}

fn main_menu(state: &NavigationState, series: &Series) -> (Vec<Button>, Vec<Vec<Button>>) {
    let mut navigation = vec![if state.has_prev() {
        Button::action("⬅ Prev", Action::Goto(Some(state.index - 1)))
    } else {
        Button::placeholder()
    }];
    if let Some(id) = series.tvdb_id {
        navigation.push(Button::url(
            "TVDB",
            format!("https://www.thetvdb.com/?tab=series&id={id}"),
        ));
    }
    if let Some(id) = series.tmdb_id {
        navigation.push(Button::url("TMDB", format!("https://www.themoviedb.org/tv/{id}")));
    }
    if let Some(id) = series.imdb_id.as_deref().filter(|id| !id.is_empty()) {
        navigation.push(Button::url("IMDB", format!("https://imdb.com/title/{id}")));
    }
    navigation.push(if state.has_next() {
        Button::action("Next ➡", Action::Goto(Some(state.index + 1)))
    } else {
        Button::placeholder()
    });

    let menu = if series.in_library() {
        vec![
            vec![Button::action("🔍 Search for Seasons", Action::Seasons)],
            vec![
                Button::label(if series.monitored { "📺 Monitored" } else { "Unmonitored" }),
                Button::label(if series.is_missing_episodes() {
                    "💾 Missing"
                } else {
                    "Downloaded"
                }),
            ],
        ]
    } else {
        vec![]
    };

    (navigation, menu)
}

fn add_menu(state: &NavigationState, in_library: bool) -> (Vec<Button>, Vec<Vec<Button>>) {
    let header = if in_library {
        "=== Editing Series ==="
    } else {
        "=== Adding Series ==="
    };
    let quality = state.quality_profile.as_ref().map_or("-", |p| p.name.as_str());
    let path = state.root_folder.as_ref().map_or("-", |f| f.path.as_str());
    let language = state.language_profile.as_ref().map_or("-", |p| p.name.as_str());
    let season_folder = if state.use_season_folder { "✅" } else { "❌" };

    let menu = vec![
        vec![Button::action(format!("Change Quality   ({quality})"), Action::Quality)],
        vec![Button::action(format!("Change Path   ({path})"), Action::Path)],
        vec![Button::action(
            format!("Change Use Season Folders   ({season_folder})"),
            Action::UseSeasonFolder,
        )],
        vec![Button::action(format!("Change Language   ({language})"), Action::Language)],
        vec![Button::action(
            format!("Change Tags   (Total: {})", state.tags.len()),
            Action::Tags,
        )],
    ];

    (vec![Button::label(header)], menu)
}

fn seasons_menu(state: &NavigationState) -> (Vec<Button>, Vec<Vec<Button>>) {
    let menu = state
        .seasons
        .available
        .iter()
        .map(|&season| {
            if state.seasons.is_selected(season) {
                vec![Button::label(format!("✔ Season {season}"))]
            } else {
                vec![Button::action(
                    format!("🔍 Season {season}"),
                    Action::SearchSeason(season),
                )]
            }
        })
        .collect();

    (vec![Button::label("=== Search for Seasons ===")], menu)
}

fn tags_menu(
    state: &NavigationState,
    snapshot: &CatalogSnapshot,
) -> (Vec<Button>, Vec<Vec<Button>>) {
    let mut menu: Vec<Vec<Button>> = snapshot
        .tags
        .iter()
        .map(|tag| {
            if state.tags.contains(&tag.id) {
                vec![Button::action(format!("Remove {}", tag.label), Action::RemTag(tag.id))]
            } else {
                vec![Button::action(format!("Tag {}", tag.label), Action::AddTag(tag.id))]
            }
        })
        .collect();
    menu.push(vec![Button::action("Done", Action::AddMenu)]);

    (vec![Button::label("=== Selecting Tags ===")], menu)
}

fn action_rows(menu: Menu, in_library: bool, allow_edit: bool) -> Vec<Vec<Button>> {
    let mut rows = Vec::new();

    if in_library {
        if allow_edit {
            if menu == Menu::Add {
                rows.push(vec![
                    Button::action("🗑 Remove", Action::Remove),
                    Button::action("✅ Submit", Action::Add(AddMode::NoSearch)),
                ]);
                rows.push(vec![Button::action(
                    "✅ + 🔍 Submit & Search",
                    Action::Add(AddMode::Search),
                )]);
            } else {
                rows.push(vec![
                    Button::action("🗑 Remove", Action::Remove),
                    Button::action("✏️ Edit", Action::AddMenu),
                ]);
            }
        }
    } else if menu == Menu::Main {
        rows.push(vec![Button::action("➕ Add", Action::AddMenu)]);
    } else if menu == Menu::Add {
        rows.push(vec![Button::action(
            "📚 Add (No Monitor)",
            Action::Add(AddMode::NoMonitor),
        )]);
        rows.push(vec![
            Button::action("📺 Monitor All", Action::Add(AddMode::NoSearch)),
            Button::action("🔍 Monitor & Search", Action::Add(AddMode::Search)),
        ]);
    }

    match menu.parent() {
        Some(Menu::Add) => rows.push(vec![Button::action("🔙 Back", Action::AddMenu)]),
        Some(_) => rows.push(vec![Button::action("🔙 Back", Action::Goto(None))]),
        None => rows.push(vec![Button::action("❌ Cancel", Action::Cancel)]),
    }

    rows
}
