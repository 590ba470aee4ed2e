use courtlight::{
    AppConfig, HeadlessStore, Intent, PassKind, Scene, ShaderKind, TextureId, Topology,
};

fn scene_with(config: &AppConfig) -> (Scene, HeadlessStore) {
    let mut store = HeadlessStore::new();
    let scene = Scene::new(&mut store, config);
    (scene, store)
}

fn missing_textures() -> AppConfig {
    AppConfig::new().textures("does/not/exist.jpg", "does/not/exist_either.jpg")
}

#[test]
fn shadows_off_skips_the_depth_pass() {
    let (mut scene, _) = scene_with(&missing_textures());
    scene.apply(Intent::ToggleShadows);

    let plan = scene.plan_frame();
    assert!(plan.depth.is_none());
    assert!(!plan.shadow.enabled);
    assert!(!plan.color.is_empty());
    assert_eq!(plan.draw_count(), plan.color.len());

    let kinds: Vec<PassKind> = plan.passes().iter().map(|p| p.kind).collect();
    assert_eq!(kinds, vec![PassKind::Color]);
}

#[test]
fn shadows_on_encodes_depth_then_colour() {
    let (scene, _) = scene_with(&missing_textures());
    let plan = scene.plan_frame();

    let passes = plan.passes();
    let kinds: Vec<PassKind> = passes.iter().map(|p| p.kind).collect();
    assert_eq!(kinds, vec![PassKind::Depth, PassKind::Color]);
    assert!(passes[0].plan.draws.iter().all(|d| d.shader == ShaderKind::ShadowMapper));
    assert_eq!(passes[1].first_slot, passes[0].plan.len());
}

#[test]
fn depth_pass_draws_casters_with_the_shadow_mapper() {
    let (scene, _) = scene_with(&missing_textures());
    let plan = scene.plan_frame();

    let depth = plan.depth.as_ref().expect("shadows are on by default");
    assert!(!depth.is_empty());
    assert!(depth.draws.iter().all(|d| d.shader == ShaderKind::ShadowMapper));
    assert!(depth.draws.iter().all(|d| d.texture == TextureId::NONE));
    assert!(depth.len() < plan.color.len());
    assert_eq!(depth.view_projection, plan.light_view_projection);
    assert!(
        plan.color
            .draws
            .iter()
            .all(|d| d.shader != ShaderKind::ShadowMapper)
    );
}

#[test]
fn missing_textures_fall_back_to_none() {
    let (scene, store) = scene_with(&missing_textures());
    assert!(store.textures.is_empty());

    let plan = scene.plan_frame();
    assert!(plan.color.draws.iter().all(|d| d.texture.is_none()));
}

#[test]
fn loaded_ground_texture_is_bound_until_textures_are_toggled_off() {
    let dir = std::env::temp_dir().join(format!("courtlight-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let ground = dir.join("clay.png");
    image::RgbaImage::from_pixel(4, 4, image::Rgba([200, 90, 40, 255]))
        .save(&ground)
        .unwrap();

    let config = AppConfig::new().textures(&ground, dir.join("missing_ball.png"));
    let (mut scene, store) = scene_with(&config);
    assert_eq!(store.textures.len(), 1);
    assert_eq!((store.textures[0].1, store.textures[0].2), (4, 4));

    // The ground is the last caster and the screen quad is hidden.
    let plan = scene.plan_frame();
    let ground_draw = plan.color.draws.last().unwrap();
    assert!(!ground_draw.texture.is_none());

    scene.apply(Intent::ToggleTextures);
    let plan = scene.plan_frame();
    assert!(plan.color.draws.last().unwrap().texture.is_none());

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn shadow_map_view_needs_shadows() {
    let (mut scene, _) = scene_with(&missing_textures());
    let screens = |scene: &Scene| {
        scene
            .plan_frame()
            .color
            .draws
            .iter()
            .filter(|d| d.shader == ShaderKind::Screen)
            .count()
    };

    assert_eq!(screens(&scene), 0);
    scene.apply(Intent::ToggleShadowMapView);
    assert_eq!(screens(&scene), 1);
    scene.apply(Intent::ToggleShadows);
    assert_eq!(screens(&scene), 0);
}

#[test]
fn racket_topology_changes_player_draws() {
    let (mut scene, _) = scene_with(&missing_textures());
    let count = |scene: &Scene, topology: Topology| {
        scene
            .plan_frame()
            .color
            .draws
            .iter()
            .filter(|d| d.topology == topology)
            .count()
    };

    let lines_before = count(&scene, Topology::Lines);
    assert_eq!(count(&scene, Topology::Points), 0);

    scene.apply(Intent::RacketTopology(Topology::Points));
    assert!(count(&scene, Topology::Points) > 0);

    scene.apply(Intent::RacketTopology(Topology::LineStrip));
    assert!(count(&scene, Topology::LineStrip) > 0);
    assert_eq!(count(&scene, Topology::Lines), lines_before);
}
