mod common;

use common::{rig, rig_configured, Rig, FULL_HD};
use novade_display_surface::headless::{
    BindingCall, DesktopResolutions, HeadlessContext, HeadlessDisplayService,
};
use novade_display_surface::{
    NativeDisplay, SurfaceConfig, VSyncMode, WindowSystem, WindowSystemKind,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn live_rig() -> Rig {
    let mut rig = rig();
    rig.manager.init_window_system().unwrap();
    rig.manager.create_new_window(1920, 1080, true).unwrap();
    rig
}

#[rstest]
#[case("EGL_KHR_image_base", true)]
#[case("EGL_KHR_fence_sync", true)]
#[case("EGL_KHR_gl_colorspace", false)]
fn binding_prefixed_names_are_answered_by_the_binding(#[case] name: &str, #[case] expected: bool) {
    let rig = live_rig();
    assert_eq!(rig.manager.is_ext_supported(name), expected);
    assert_eq!(rig.manager.binding().queries(), vec![name.to_string()]);
    assert!(rig.manager.renderer().queries().is_empty());
}

#[rstest]
#[case("GL_OES_EGL_image", true)]
#[case("GL_EXT_texture_format_BGRA8888", true)]
#[case("egl_KHR_image_base", false)]
#[case("", false)]
fn other_names_are_answered_by_the_renderer(#[case] name: &str, #[case] expected: bool) {
    let rig = live_rig();
    assert_eq!(rig.manager.is_ext_supported(name), expected);
    assert_eq!(rig.manager.renderer().queries(), vec![name.to_string()]);
    assert!(rig.manager.binding().queries().is_empty());
}

#[rstest]
#[case(true, VSyncMode::Enabled, 10)]
#[case(false, VSyncMode::Disabled, 0)]
fn vsync_mode_follows_request(#[case] enable: bool, #[case] mode: VSyncMode, #[case] code: i32) {
    let mut rig = live_rig();
    rig.manager.set_vsync(enable);

    assert_eq!(rig.manager.vsync_mode(), mode);
    assert_eq!(rig.manager.vsync_mode().code(), code);
    assert_eq!(rig.manager.binding().vsync(), Some(enable));
}

#[test]
fn vsync_mode_is_recorded_even_when_binding_refuses() {
    let mut rig = live_rig();
    rig.manager.binding_mut().set_fail_vsync(true);
    rig.manager.set_vsync(false);

    assert_eq!(rig.manager.vsync_mode(), VSyncMode::Disabled);
    assert_eq!(rig.manager.binding().vsync(), Some(true));
    assert_eq!(
        rig.journal.binding_calls().last(),
        Some(&BindingCall::SetVSync(false))
    );
}

#[rstest]
#[case(true, VSyncMode::Enabled)]
#[case(false, VSyncMode::Disabled)]
fn configured_vsync_is_applied_once_the_surface_exists(
    #[case] vsync: bool,
    #[case] mode: VSyncMode,
) {
    let config = SurfaceConfig {
        vsync,
        ..SurfaceConfig::default()
    };
    let mut rig = rig_configured(
        HeadlessDisplayService::new(FULL_HD),
        DesktopResolutions::new(),
        config,
    );
    rig.manager.init_window_system().unwrap();
    assert_eq!(rig.manager.vsync_mode(), VSyncMode::Disabled);
    assert_eq!(rig.manager.binding().vsync(), None);

    rig.manager.create_new_window(1920, 1080, true).unwrap();
    assert_eq!(rig.manager.vsync_mode(), mode);
    assert_eq!(rig.manager.binding().vsync(), Some(vsync));
    let window = rig.manager.native_window().unwrap();
    assert_eq!(
        rig.journal.binding_calls(),
        vec![BindingCall::CreateWindow(window), BindingCall::SetVSync(vsync)]
    );
}

#[test]
fn refused_surface_leaves_vsync_untouched() {
    let mut rig = rig();
    rig.manager.init_window_system().unwrap();
    rig.manager.binding_mut().set_fail_create(true);

    assert!(rig.manager.create_new_window(1920, 1080, true).is_err());
    assert_eq!(rig.manager.vsync_mode(), VSyncMode::Disabled);
    assert_eq!(rig.manager.binding().vsync(), None);
}

#[test]
fn present_render_swaps_once_per_frame() {
    let mut rig = live_rig();
    for _ in 0..3 {
        rig.manager.present_render(&[]).unwrap();
    }
    assert_eq!(rig.manager.binding().swaps(), 3);
}

#[test]
fn minimize_hides_and_restore_shows_but_reports_false() {
    let mut rig = live_rig();
    assert!(rig.manager.is_visible());

    assert!(rig.manager.minimize());
    assert!(!rig.manager.is_visible());

    assert!(!rig.manager.restore());
    assert!(rig.manager.is_visible());

    assert!(rig.manager.hide());
    assert!(!rig.manager.is_visible());
    assert!(rig.manager.show(false));
    assert!(rig.manager.is_visible());
}

#[test]
fn visibility_changes_leave_surface_and_layer_alone() {
    let mut rig = live_rig();
    let before = rig.journal.entries().len();

    rig.manager.minimize();
    rig.manager.restore();
    rig.manager.show_os_mouse(true);
    rig.manager.notify_app_active_change(false);

    assert_eq!(rig.journal.entries().len(), before);
    assert!(rig.manager.is_window_created());
}

#[test]
fn context_and_display_come_from_the_binding() {
    let rig = rig();
    assert_eq!(rig.manager.egl_context(), HeadlessContext(0));
    assert_eq!(rig.manager.egl_display(), None);

    let rig = live_rig();
    assert_eq!(rig.manager.egl_context(), HeadlessContext(1));
    assert_eq!(rig.manager.egl_display(), Some(NativeDisplay::DEFAULT));
}

#[test]
fn window_system_kind_is_egl() {
    let rig = rig();
    assert_eq!(rig.manager.window_system_kind(), WindowSystemKind::Egl);
}
