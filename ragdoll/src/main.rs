//! # Ragdoll
//!
//! 可用鼠标拖拽的人形布娃娃
//!
//! 布娃娃由11个盒状刚体和10个锥形-扭转关节组成，在重力作用下落到地面上；
//! 按住任意部件即可通过光标约束拖动它。
//!
//! ## 模块组织
//!
//! - `rig`: 布娃娃装配与抓取状态机
//! - `demos`: 人形配置生成器
//! - `world`: rapier物理后端和仿真参数
//! - `main`: Bevy渲染、指针输入和主循环

mod demos;
mod rig;
mod world;

use bevy::picking::mesh_picking::MeshPickingPlugin;
use bevy::picking::pointer::PointerId;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use demos::{create_humanoid, RagdollParams};
use rig::{assemble, rig_center_of_mass, PhysicsEngine, PointerEvent, Rig, RigidBodyHandle};
use world::{create_ground, PhysicsSettings, RapierEngine};

/// 正交相机缩放（每个世界单位对应的像素数）
const CAMERA_ZOOM: f32 = 25.0;
/// 每隔多少个物理步打印一次状态
const STATUS_INTERVAL: u64 = 600;

/// 物理场景资源
#[derive(Resource)]
struct RagdollScene {
    engine: RapierEngine,
    rig: Rig,
    settings: PhysicsSettings,
    steps: u64,
}

/// 部件可视化组件
#[derive(Component)]
struct LimbVisual {
    part: String,
    body: RigidBodyHandle,
}

/// 光标可视化组件
#[derive(Component)]
struct CursorVisual;

fn main() {
    App::new()
        .add_plugins((
            DefaultPlugins.set(WindowPlugin {
                primary_window: Some(Window {
                    title: "Ragdoll - drag a limb with the mouse".to_string(),
                    resolution: (1280.0, 720.0).into(),
                    ..default()
                }),
                ..default()
            }),
            MeshPickingPlugin,
        ))
        .insert_resource(ClearColor(Color::srgb_u8(0x17, 0x17, 0x20)))
        .insert_resource(AmbientLight {
            brightness: 200.0,
            ..default()
        })
        .add_systems(Startup, setup)
        .add_systems(
            Update,
            (track_cursor, release_on_button_up, physics_step, update_visuals)
                .chain()
                .run_if(resource_exists::<RagdollScene>),
        )
        .add_systems(Last, teardown_on_exit)
        .run();
}

/// 初始化场景
fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut exit: EventWriter<AppExit>,
) {
    let settings = PhysicsSettings::default();
    let mut engine = RapierEngine::new(&settings);

    let (config, topology) = create_humanoid(&RagdollParams::default());
    let rig = match create_ground(&mut engine, settings.ground_height)
        .and_then(|_| assemble(&mut engine, &config, &topology))
    {
        Ok(rig) => rig,
        Err(err) => {
            error!("failed to build ragdoll scene: {err}");
            exit.send(AppExit::error());
            return;
        }
    };

    // 每个部件一个盒子网格，挂上指针观察者
    for part in rig.parts() {
        let spec = &config.shapes[&part.name];
        let material = materials.add(StandardMaterial {
            base_color: spec.color.into(),
            perceptual_roughness: 0.6,
            ..default()
        });

        commands
            .spawn((
                Mesh3d(meshes.add(Cuboid::from_size(spec.size()))),
                MeshMaterial3d(material),
                Transform::from_translation(spec.rest_position),
                LimbVisual {
                    part: part.name.clone(),
                    body: part.body,
                },
                Name::new(part.name.clone()),
            ))
            .observe(on_limb_down)
            .observe(on_limb_up)
            .observe(on_limb_out);
    }

    // 光标可视化（小球）
    commands.spawn((
        Mesh3d(meshes.add(Sphere::new(0.25))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::WHITE,
            unlit: true,
            ..default()
        })),
        Transform::from_translation(rig.grab().cursor_target()),
        CursorVisual,
        PickingBehavior::IGNORE,
    ));

    // 地面
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(1000.0, 1000.0))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb_u8(0x17, 0x17, 0x20),
            ..default()
        })),
        Transform::from_xyz(0.0, settings.ground_height, 0.0),
        PickingBehavior::IGNORE,
    ));

    // 添加光照
    commands.spawn((
        DirectionalLight {
            illuminance: 8000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(15.0, 15.0, 15.0).looking_at(Vec3::ZERO, Dir3::Y),
    ));

    commands.spawn((
        PointLight {
            color: Color::srgb(1.0, 0.0, 0.0),
            intensity: 1_000_000.0,
            ..default()
        },
        Transform::from_xyz(-10.0, -10.0, -10.0),
    ));

    // 正交相机
    commands.spawn((
        Camera3d::default(),
        Projection::Orthographic(OrthographicProjection {
            scale: 1.0 / CAMERA_ZOOM,
            ..OrthographicProjection::default_3d()
        }),
        Transform::from_xyz(-25.0, 20.0, 25.0).looking_at(Vec3::ZERO, Dir3::Y),
    ));

    info!("=== Ragdoll Simulation Started ===");
    info!("Control:");
    info!("  Left mouse: grab and drag a limb");

    commands.insert_resource(RagdollScene {
        engine,
        rig,
        settings,
        steps: 0,
    });
}

/// 把指针事件交给抓取状态机
fn route_pointer(scene: &mut RagdollScene, part: &str, pointer: PointerId, event: PointerEvent) {
    let RagdollScene { engine, rig, .. } = scene;
    if let Err(err) = rig.grab_mut().handle_pointer(engine, part, pointer, event) {
        warn!("ignored {event:?} on {part}: {err}");
    }
}

fn on_limb_down(
    mut trigger: Trigger<Pointer<Down>>,
    limbs: Query<&LimbVisual>,
    mut scene: ResMut<RagdollScene>,
) {
    trigger.propagate(false);
    if let Ok(limb) = limbs.get(trigger.entity()) {
        route_pointer(&mut scene, &limb.part, trigger.pointer_id, PointerEvent::Down);
    }
}

fn on_limb_up(
    trigger: Trigger<Pointer<Up>>,
    limbs: Query<&LimbVisual>,
    mut scene: ResMut<RagdollScene>,
) {
    if let Ok(limb) = limbs.get(trigger.entity()) {
        route_pointer(&mut scene, &limb.part, trigger.pointer_id, PointerEvent::Up);
    }
}

fn on_limb_out(
    trigger: Trigger<Pointer<Out>>,
    limbs: Query<&LimbVisual>,
    mut scene: ResMut<RagdollScene>,
) {
    if let Ok(limb) = limbs.get(trigger.entity()) {
        route_pointer(&mut scene, &limb.part, trigger.pointer_id, PointerEvent::Leave);
    }
}

/// 鼠标在任意位置抬起时释放被捕获的部件
fn release_on_button_up(buttons: Res<ButtonInput<MouseButton>>, mut scene: ResMut<RagdollScene>) {
    if !buttons.just_released(MouseButton::Left) {
        return;
    }
    let RagdollScene { engine, rig, .. } = &mut *scene;
    if let Some(part) = rig.grab_mut().release_pointer(engine, PointerId::Mouse) {
        debug!("released {part}");
    }
}

/// 把指针投影到 z=0 平面，写入光标刚体
fn track_cursor(
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform)>,
    mut scene: ResMut<RagdollScene>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };
    let Some(cursor_position) = window.cursor_position() else {
        return;
    };
    let Ok((camera, camera_transform)) = cameras.get_single() else {
        return;
    };
    let Ok(ray) = camera.viewport_to_world(camera_transform, cursor_position) else {
        return;
    };
    let Some(distance) = ray.intersect_plane(Vec3::ZERO, InfinitePlane3d::new(Vec3::Z)) else {
        return;
    };

    let target = ray.get_point(distance);
    let RagdollScene { engine, rig, .. } = &mut *scene;
    rig.grab_mut().track_cursor(engine, target);
}

/// 物理仿真步进
fn physics_step(mut scene: ResMut<RagdollScene>) {
    for _ in 0..scene.settings.substeps {
        scene.engine.step();
        scene.steps += 1;

        // 定期打印调试信息
        if scene.steps % STATUS_INTERVAL == 0 {
            let com = rig_center_of_mass(&scene.engine, &scene.rig);
            let swing = scene.rig.joint_swing(&scene.engine, "pelvis");
            if let (Some(com), Some(swing)) = (com, swing) {
                info!(
                    "Time: {:.2}s | COM y: {:.3} | spine swing: {:.3} rad ({:.1}°) | grabbed: {:?}",
                    scene.engine.time(),
                    com.y,
                    swing,
                    swing.to_degrees(),
                    scene.rig.grab().grabbed()
                );
            }
        }
    }
}

/// 更新可视化
fn update_visuals(
    scene: Res<RagdollScene>,
    mut limbs: Query<(&mut Transform, &LimbVisual), Without<CursorVisual>>,
    mut cursor: Query<&mut Transform, With<CursorVisual>>,
) {
    for (mut transform, limb) in limbs.iter_mut() {
        // 从物理引擎同步位置和姿态
        if let Some(pose) = scene.engine.body_pose(limb.body) {
            transform.translation = pose.position;
            transform.rotation = pose.rotation;
        }
    }

    if let Ok(mut transform) = cursor.get_single_mut() {
        transform.translation = scene.rig.grab().cursor_target();
    }
}

/// 退出时拆除布娃娃
fn teardown_on_exit(world: &mut World) {
    if world.resource::<Events<AppExit>>().is_empty() {
        return;
    }
    if let Some(RagdollScene {
        mut engine, rig, ..
    }) = world.remove_resource::<RagdollScene>()
    {
        rig.teardown(&mut engine);
    }
}
