//! Built-in binding sets.
//!
//! [`baseline_bindings`] is installed by the shell and is always present.
//! [`patient_switch_bindings`] and [`analysis_bindings`] are registered by
//! the patient list and the analysis view while they are mounted.

use std::sync::Arc;

use clinic_shell_core::{HandlerResult, PatientRecord};

use super::binding::{ShortcutAction, ShortcutBinding, ShortcutCategory, ShortcutContext};
use super::chord::KeyChord;
use super::dispatcher::OverlayState;
use crate::navigation::{Navigator, Route};

/// Number of patients reachable through Alt+digit.
pub const MAX_PATIENT_SHORTCUTS: usize = 9;

fn navigate_to(
    navigator: &Arc<dyn Navigator>,
    chord: KeyChord,
    description: &str,
    route: Route,
    category: ShortcutCategory,
) -> ShortcutBinding {
    let navigator = navigator.clone();
    ShortcutBinding::new(chord, description, move || navigator.navigate(route))
        .with_category(category)
        .with_context(ShortcutContext::Global)
        .with_suppress_default(true)
}

/// The bindings every running shell has.
///
/// | Keys | Action |
/// |------|--------|
/// | Shift+D / P / V / T / A | go to dashboard, patients, visits, transcripts, AI analysis |
/// | Primary+U | upload transcript (opens visits) |
/// | Primary+Shift+I | start AI analysis |
/// | Primary+F | search patients |
/// | Primary+K | show quick search |
/// | ? | show shortcut help |
/// | Escape | hide help and quick search |
pub fn baseline_bindings(navigator: Arc<dyn Navigator>, overlays: OverlayState) -> Vec<ShortcutBinding> {
    use ShortcutCategory::{Analysis, General, Navigation, Patient};

    let mut bindings = vec![
        navigate_to(&navigator, KeyChord::shift("d"), "Go to Dashboard", Route::Dashboard, Navigation),
        navigate_to(&navigator, KeyChord::shift("p"), "Go to Patients", Route::Patients, Navigation),
        navigate_to(&navigator, KeyChord::shift("v"), "Go to Visits", Route::Visits, Navigation),
        navigate_to(&navigator, KeyChord::shift("t"), "Go to Transcripts", Route::Transcripts, Navigation),
        navigate_to(&navigator, KeyChord::shift("a"), "Go to AI Analysis", Route::AiAgent, Navigation),
        navigate_to(&navigator, KeyChord::ctrl("u"), "Upload Transcript", Route::Visits, General),
        navigate_to(&navigator, KeyChord::ctrl_shift("i"), "Start AI Analysis", Route::AiAgent, Analysis),
        navigate_to(&navigator, KeyChord::ctrl("f"), "Search Patients", Route::Patients, Patient),
    ];

    let search = overlays.clone();
    bindings.push(
        ShortcutBinding::new(KeyChord::ctrl("k"), "Global Search", move || {
            search.set_quick_search_visible(true);
            Ok(())
        })
        .with_context(ShortcutContext::Global)
        .with_suppress_default(true),
    );

    let help = overlays.clone();
    bindings.push(
        ShortcutBinding::new(KeyChord::key_only("?"), "Show Keyboard Shortcuts", move || {
            help.set_help_visible(true);
            Ok(())
        })
        .with_context(ShortcutContext::Global)
        .with_suppress_default(true),
    );

    bindings.push(
        ShortcutBinding::new(KeyChord::key_only("Escape"), "Close Modals/Cancel", move || {
            overlays.dismiss_all();
            Ok(())
        })
        .with_context(ShortcutContext::Global),
    );

    bindings
}

/// Alt+1 through Alt+9 select the first nine patients of a list.
///
/// Extra patients get no shortcut.
pub fn patient_switch_bindings<F>(patients: &[PatientRecord], on_select: F) -> Vec<ShortcutBinding>
where
    F: Fn(&PatientRecord) -> HandlerResult + Send + Sync + 'static,
{
    let on_select = Arc::new(on_select);
    patients
        .iter()
        .take(MAX_PATIENT_SHORTCUTS)
        .enumerate()
        .map(|(index, patient)| {
            let on_select = on_select.clone();
            let patient = patient.clone();
            let description = format!("Switch to {}", patient.full_name());
            ShortcutBinding::new(KeyChord::alt((index + 1).to_string()), description, move || {
                on_select(&patient)
            })
            .with_category(ShortcutCategory::Patient)
            .with_context(ShortcutContext::PatientList)
            .with_suppress_default(true)
        })
        .collect()
}

/// Actions behind the analysis view's shortcuts.
#[derive(Clone)]
pub struct AnalysisActions {
    /// Re-run the current analysis.
    pub refresh: ShortcutAction,
    /// Save the current analysis.
    pub save: ShortcutAction,
    /// Export the current analysis.
    pub export: ShortcutAction,
}

impl AnalysisActions {
    /// Build from three closures.
    pub fn new<R, S, E>(refresh: R, save: S, export: E) -> Self
    where
        R: Fn() -> HandlerResult + Send + Sync + 'static,
        S: Fn() -> HandlerResult + Send + Sync + 'static,
        E: Fn() -> HandlerResult + Send + Sync + 'static,
    {
        Self {
            refresh: Arc::new(refresh),
            save: Arc::new(save),
            export: Arc::new(export),
        }
    }
}

/// Primary+R, Primary+S and Primary+E for the analysis view.
pub fn analysis_bindings(actions: AnalysisActions) -> Vec<ShortcutBinding> {
    [
        ("r", "Refresh Analysis", actions.refresh),
        ("s", "Save Analysis", actions.save),
        ("e", "Export Analysis", actions.export),
    ]
    .into_iter()
    .map(|(key, description, action)| {
        ShortcutBinding::from_action(KeyChord::ctrl(key), description, action)
            .with_category(ShortcutCategory::Analysis)
            .with_context(ShortcutContext::Analysis)
            .with_suppress_default(true)
    })
    .collect()
}
