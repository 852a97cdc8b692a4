use super::*;
use host_bridge::recording::{HostCall, RecordingPlatform};
use std::collections::HashSet;

#[derive(Default)]
struct TestSurface {
    active: Option<Screen>,
    missing: HashSet<Screen>,
}

impl ScreenSurface for TestSurface {
    fn activate(&mut self, screen: Screen) -> bool {
        if self.missing.contains(&screen) {
            return false;
        }
        self.active = Some(screen);
        true
    }
}

fn controller(initial: Screen) -> (Arc<RecordingPlatform>, NavigationController) {
    let platform = Arc::new(RecordingPlatform::new());
    let bridge = Arc::new(HostBridge::new(platform.clone()));
    bridge.initialize().expect("host available");
    platform.clear();
    (platform, NavigationController::new(initial, bridge))
}

#[test]
fn chrome_mapping_is_total_and_deterministic() {
    for screen in Screen::ALL {
        assert_eq!(chrome_for(screen), chrome_for(screen));
        assert!(!chrome_for(screen).main_button);
    }
    assert!(chrome_for(Screen::CharacterCreation).back_button);
    assert!(chrome_for(Screen::GameScreen).back_button);
    assert_eq!(chrome_for(Screen::MainMenu), ChromeConfig::default());
    assert_eq!(chrome_for(Screen::Loading), ChromeConfig::default());
    assert_eq!(chrome_for(Screen::Error), ChromeConfig::default());
}

#[test]
fn entering_character_creation_from_main_menu() {
    let (platform, mut nav) = controller(Screen::MainMenu);
    let mut surface = TestSurface::default();

    assert!(nav.go_to(Screen::CharacterCreation, &mut surface));

    assert_eq!(nav.current(), Screen::CharacterCreation);
    assert_eq!(nav.history(), &[Screen::MainMenu]);
    assert_eq!(surface.active, Some(Screen::CharacterCreation));
    assert_eq!(
        platform.calls(),
        vec![HostCall::HideMainButton, HostCall::ShowBackButton]
    );
}

#[test]
fn going_back_returns_to_main_menu_with_empty_history() {
    let (platform, mut nav) = controller(Screen::MainMenu);
    let mut surface = TestSurface::default();
    nav.go_to(Screen::CharacterCreation, &mut surface);
    platform.clear();

    nav.go_back(&mut surface);

    assert_eq!(nav.current(), Screen::MainMenu);
    assert!(nav.history().is_empty());
    assert_eq!(surface.active, Some(Screen::MainMenu));
    assert_eq!(
        platform.calls(),
        vec![HostCall::HideMainButton, HostCall::HideBackButton]
    );
}

#[test]
fn each_go_to_grows_history_by_one_and_back_unwinds_in_order() {
    let (_, mut nav) = controller(Screen::Loading);
    let mut surface = TestSurface::default();
    let route = [
        Screen::MainMenu,
        Screen::CharacterCreation,
        Screen::GameScreen,
        Screen::GameScreen,
        Screen::MainMenu,
    ];

    let mut visited = vec![Screen::Loading];
    for (step, screen) in route.into_iter().enumerate() {
        assert!(nav.go_to(screen, &mut surface));
        assert_eq!(nav.history().len(), step + 1);
        assert_eq!(surface.active, Some(screen));
        visited.push(screen);
    }

    for expected in visited.iter().rev().skip(1) {
        nav.go_back(&mut surface);
        assert_eq!(nav.current(), *expected);
        assert_eq!(surface.active, Some(*expected));
    }
    assert!(nav.history().is_empty());
}

#[test]
fn go_back_on_empty_history_lands_on_default_screen() {
    let (_, mut nav) = controller(Screen::GameScreen);
    let mut surface = TestSurface::default();

    nav.go_back(&mut surface);
    assert_eq!(nav.current(), Screen::DEFAULT);
    assert!(nav.history().is_empty());

    nav.go_back(&mut surface);
    assert_eq!(nav.current(), Screen::MainMenu);
    assert!(nav.history().is_empty());
}

#[test]
fn unknown_screen_id_is_a_no_op() {
    let (platform, mut nav) = controller(Screen::MainMenu);
    let mut surface = TestSurface::default();

    assert!(!nav.go_to_id("inventory", &mut surface));
    assert_eq!(nav.current(), Screen::MainMenu);
    assert!(nav.history().is_empty());
    assert!(platform.calls().is_empty());

    assert!(nav.go_to_id("game-screen", &mut surface));
    assert_eq!(nav.current(), Screen::GameScreen);
}

#[test]
fn missing_surface_leaves_state_and_chrome_untouched() {
    let (platform, mut nav) = controller(Screen::MainMenu);
    let mut surface = TestSurface::default();
    nav.go_to(Screen::CharacterCreation, &mut surface);
    platform.clear();
    surface.missing.insert(Screen::GameScreen);
    surface.missing.insert(Screen::MainMenu);

    assert!(!nav.go_to(Screen::GameScreen, &mut surface));
    nav.go_back(&mut surface);

    assert_eq!(nav.current(), Screen::CharacterCreation);
    assert_eq!(nav.history(), &[Screen::MainMenu]);
    assert_eq!(surface.active, Some(Screen::CharacterCreation));
    assert!(platform.calls().is_empty());
}
