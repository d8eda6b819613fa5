//! Headless симуляция патруля
//!
//! Кольцевой маршрут, двое полицейских, грабитель, укрытия, трафик и животные.

use bevy::prelude::*;
use patrol_simulation::spawn::{
    spawn_cover, spawn_path, spawn_police, spawn_robber, spawn_vehicle_spawner, spawn_wanderer,
};
use patrol_simulation::{
    create_headless_app, log_info, DetectionBackend, PathPoint, PoliceBrain, PoliceConfig, RobberBrain,
    RobberConfig, SpawnerConfig, Vehicle, WanderConfig, WaypointPath,
};

fn main() {
    let seed = 42;
    let mut app = create_headless_app(seed);
    log_info(&format!("Starting patrol simulation (seed: {})", seed));

    let world = app.world_mut();
    let backend = DetectionBackend::Headless;

    let square = [
        Vec3::new(-20.0, 0.0, -20.0),
        Vec3::new(20.0, 0.0, -20.0),
        Vec3::new(20.0, 0.0, 20.0),
        Vec3::new(-20.0, 0.0, 20.0),
    ];
    let patrol_route = spawn_path(world, WaypointPath::from_positions(square, true));
    let robber_route = spawn_path(
        world,
        WaypointPath::from_positions([Vec3::new(0.0, 0.0, -10.0), Vec3::new(0.0, 0.0, 10.0)], true),
    );
    let road = spawn_path(
        world,
        WaypointPath::new(
            vec![
                PathPoint::new(Vec3::new(-40.0, 0.0, 30.0)),
                PathPoint::new(Vec3::new(0.0, 0.0, 30.0)).with_speed_limit(6.0).slow_down_zone(),
                PathPoint::new(Vec3::new(20.0, 0.0, 30.0)).stop_point(2.0),
                PathPoint::new(Vec3::new(40.0, 0.0, 30.0)),
            ],
            false,
        ),
    );

    spawn_police(world, square[0], patrol_route, PoliceConfig::default(), backend);
    spawn_police(world, square[2], patrol_route, PoliceConfig::default(), backend);
    spawn_robber(world, Vec3::new(0.0, 0.0, -10.0), robber_route, RobberConfig::default(), backend);

    for cover in [Vec3::new(8.0, 0.0, 0.0), Vec3::new(-8.0, 0.0, 5.0), Vec3::new(0.0, 0.0, 15.0)] {
        spawn_cover(world, cover, backend);
    }

    spawn_vehicle_spawner(world, SpawnerConfig::default(), vec![road]);
    spawn_wanderer(world, Vec3::new(-30.0, 0.0, -30.0), WanderConfig::default());

    // Запускаем 1000 тиков симуляции
    for tick in 0..1000 {
        app.update();

        if tick % 100 == 0 {
            let world = app.world_mut();
            let police: Vec<String> = world
                .query::<&PoliceBrain>()
                .iter(world)
                .map(|brain| format!("{:?}", brain.state()))
                .collect();
            let robbers: Vec<String> = world
                .query::<&RobberBrain>()
                .iter(world)
                .map(|brain| format!("{:?}", brain.state()))
                .collect();
            let vehicles = world.query::<&Vehicle>().iter(world).count();

            log_info(&format!(
                "Tick {}: police {:?}, robbers {:?}, vehicles {}",
                tick, police, robbers, vehicles
            ));
        }
    }

    log_info("Simulation complete!");
}
