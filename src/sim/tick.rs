//! Fixed timestep simulation tick
//!
//! Advances one level attempt deterministically: input, last-shot check,
//! ball integration, screen clamp, contacts and settling.

use glam::Vec2;

use super::collision::bounce_velocity;
use super::obstacles::{Category, Obstacle};
use super::state::{GameEvent, LevelState, Outcome, Phase};
use super::timer::CheckPoll;
use super::trajectory::Aim;
use crate::gravity_to_points;

/// Pointer gesture in playfield coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragEvent {
    Begin(Vec2),
    Move(Vec2),
    End(Vec2),
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer gesture this tick
    pub drag: Option<DragEvent>,
    /// Pause toggle
    pub pause: bool,
    /// Restart the level (from the UI collaborator)
    pub restart: bool,
}

/// Advance the level by one fixed timestep
pub fn tick(state: &mut LevelState, input: &TickInput, dt: f32) {
    if input.restart {
        state.restart();
    }
    if input.pause {
        state.toggle_pause();
    }
    match input.drag {
        Some(DragEvent::Begin(point)) => {
            state.drag_begin(point);
        }
        Some(DragEvent::Move(point)) => state.drag_move(point),
        Some(DragEvent::End(point)) => {
            state.drag_end(point);
        }
        None => {}
    }

    // Don't tick if paused or resolved
    if state.paused || state.is_resolved() {
        return;
    }

    state.time_ticks += 1;
    state.time += dt;

    match state.last_shot_check.poll(state.attempt, state.time) {
        CheckPoll::Due => {
            log::info!("Last shot timed out without reaching the finish");
            state.resolve(Outcome::GameOver);
            return;
        }
        CheckPoll::Stale => log::debug!("Dropped last-shot check from an earlier attempt"),
        CheckPoll::Idle | CheckPoll::Pending => {}
    }

    if state.ball.is_free() {
        step_ball(state, dt);
    }
}

/// Fire the ball with the given aim
///
/// No-op when no shots are left or the attempt is paused or resolved.
/// Consumes exactly one shot otherwise.
pub fn launch(state: &mut LevelState, aim: Aim) -> bool {
    if state.paused || state.is_resolved() {
        return false;
    }
    if !state.shots.consume() {
        log::debug!("Launch ignored, no shots left");
        return false;
    }

    let impulse = aim.impulse(&state.tuning);
    state.ball.launch(impulse);
    state.phase = Phase::Flying;

    let shots_remaining = state.shots.shots_remaining;
    log::debug!(
        "Shot fired: angle={:.2} power={:.1} impulse={:?}, {} left",
        aim.angle,
        aim.power,
        impulse,
        shots_remaining
    );
    state.push_event(GameEvent::ShotFired { shots_remaining });

    if shots_remaining == 0 {
        let delay = state.tuning.last_shot_timeout_secs;
        state
            .last_shot_check
            .schedule(state.attempt, state.time, delay);
    }
    true
}

/// Launch from an explicit angle (radians) and drag power
pub fn launch_at(state: &mut LevelState, angle: f32, power: f32) -> bool {
    let aim = Aim::new(angle, power, &state.tuning);
    launch(state, aim)
}

fn step_ball(state: &mut LevelState, dt: f32) {
    let gravity = gravity_to_points(state.definition.gravity);
    let ball = &mut state.ball;

    ball.vel += gravity * dt;
    ball.vel *= 1.0 / (1.0 + ball.linear_damping * dt);
    ball.angular_vel *= 1.0 / (1.0 + ball.angular_damping * dt);
    ball.pos += ball.vel * dt;
    ball.rotation += ball.angular_vel * dt;

    if ball.pos.y < -ball.diameter() {
        ball_lost(state);
        return;
    }

    clamp_to_screen(state);
    let supported = resolve_contacts(state);

    if !state.is_resolved() {
        update_settle(state, supported, dt);
    }
}

/// Ball fell below the playfield
fn ball_lost(state: &mut LevelState) {
    if state.shots.shots_remaining > 0 {
        log::debug!("Ball lost, back to the platform");
        state.reset_ball();
        state.push_event(GameEvent::BallReset);
    } else if !state.is_resolved() {
        log::info!("Ball lost with no shots left");
        state.resolve(Outcome::GameOver);
    }
}

/// Soft bounce off the invisible screen edges
fn clamp_to_screen(state: &mut LevelState) {
    let field = state.playfield;
    let bounce = state.tuning.edge_bounce;
    let rest_speed = state.tuning.rest_bounce_speed;
    let ball = &mut state.ball;

    let min = Vec2::splat(ball.radius);
    let max = Vec2::new(field.width - ball.radius, field.height - ball.radius);
    let mut impact_speed = 0.0f32;

    if ball.pos.x < min.x {
        ball.pos.x = min.x;
        impact_speed = impact_speed.max(-ball.vel.x);
        ball.vel.x = ball.vel.x.abs() * bounce;
    } else if ball.pos.x > max.x {
        ball.pos.x = max.x;
        impact_speed = impact_speed.max(ball.vel.x);
        ball.vel.x = -ball.vel.x.abs() * bounce;
    }

    if ball.pos.y < min.y {
        ball.pos.y = min.y;
        impact_speed = impact_speed.max(-ball.vel.y);
        ball.vel.y = ball.vel.y.abs() * bounce;
    } else if ball.pos.y > max.y {
        ball.pos.y = max.y;
        impact_speed = impact_speed.max(ball.vel.y);
        ball.vel.y = -ball.vel.y.abs() * bounce;
    }

    if impact_speed > rest_speed {
        state.push_event(GameEvent::Impact);
    }
}

/// Resolve contacts in registry order; returns whether the ball rests on
/// something below it
fn resolve_contacts(state: &mut LevelState) -> bool {
    let obstacles: Vec<Obstacle> = state.registry.iter().copied().collect();
    let mut touching = Vec::with_capacity(4);
    let mut supported = false;

    for obstacle in obstacles {
        // Nothing else counts once the attempt ended this tick
        if state.is_resolved() {
            break;
        }
        if obstacle.category == Category::Star && !state.stars.is_present(obstacle.index) {
            continue;
        }

        let contact = obstacle.shape.collide(state.ball.pos, state.ball.radius);
        if !contact.hit {
            continue;
        }
        let is_new = !state.ball.contacts.contains(&obstacle.id);
        touching.push(obstacle.id);

        match obstacle.category {
            Category::Wall | Category::Ground => {
                let rest_speed = state.tuning.rest_bounce_speed;
                let ball = &mut state.ball;
                ball.pos += contact.normal * contact.penetration;
                ball.vel = bounce_velocity(
                    ball.vel,
                    contact.normal,
                    ball.restitution,
                    ball.friction,
                    rest_speed,
                );
                // Roll along the surface
                let tangent = Vec2::new(-contact.normal.y, contact.normal.x);
                ball.angular_vel = ball.vel.dot(tangent) / ball.radius;
                if contact.normal.y > 0.5 {
                    supported = true;
                }
                if is_new {
                    state.push_event(GameEvent::Impact);
                }
            }
            Category::Star => {
                if state.stars.collect(obstacle.index) {
                    log::debug!(
                        "Star {} collected ({}/{})",
                        obstacle.index,
                        state.stars.collected(),
                        state.stars.total()
                    );
                    state.push_event(GameEvent::StarCollected {
                        index: obstacle.index,
                    });
                }
            }
            Category::LethalWall => {
                state.resolve(Outcome::GameOver);
            }
            Category::FinishLine => {
                let outcome = Outcome::LevelComplete {
                    stars: state.stars.collected(),
                    coins: state.definition.coin_reward,
                };
                state.resolve(outcome);
            }
        }
    }

    state.ball.contacts = touching;
    supported
}

/// Drop the dynamic body once the ball has stayed still on a support
fn update_settle(state: &mut LevelState, supported: bool, dt: f32) {
    let settle_secs = state.tuning.settle_secs;
    let ball = &mut state.ball;

    if supported && ball.vel.length() < state.tuning.settle_speed {
        ball.still_time += dt;
    } else {
        ball.still_time = 0.0;
    }

    if ball.still_time >= settle_secs {
        ball.settle();
        log::debug!("Ball settled at {:?}", ball.pos);
        if state.phase == Phase::Flying {
            state.phase = Phase::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Playfield;
    use crate::consts::SIM_DT;
    use crate::levels::{LevelCatalog, LevelDefinition, WallSpec};
    use crate::sim::state::{BallState, Overlay};
    use crate::tuning::ShotTuning;
    use proptest::prelude::*;

    fn field() -> Playfield {
        Playfield::new(400.0, 800.0)
    }

    fn level(id: u32) -> LevelState {
        let def = LevelCatalog::new(field()).definition_for(id);
        LevelState::new(def, field(), ShotTuning::default())
    }

    /// Open field: ground and finish line only
    fn open_level(shot_budget: u32) -> LevelState {
        let mut def: LevelDefinition = LevelCatalog::new(field()).definition_for(1);
        def.walls.clear();
        def.stars.clear();
        def.shot_budget = shot_budget;
        LevelState::new(def, field(), ShotTuning::default())
    }

    fn run(state: &mut LevelState, ticks: u32) {
        let input = TickInput::default();
        for _ in 0..ticks {
            tick(state, &input, SIM_DT);
        }
    }

    fn shoot(state: &mut LevelState, drag: Vec2) -> bool {
        let start = Vec2::new(200.0, 400.0);
        state.drag_begin(start);
        state.drag_end(start - drag)
    }

    #[test]
    fn test_shot_consumes_exactly_one() {
        let mut state = level(1);
        assert!(shoot(&mut state, Vec2::new(50.0, 50.0)));
        assert_eq!(state.shots.shots_remaining, 2);
        assert_eq!(state.phase, Phase::Flying);
        assert!(state.is_ball_moving());
        assert_eq!(
            state.take_events(),
            vec![GameEvent::ShotFired { shots_remaining: 2 }]
        );

        // Ticks never consume shots
        run(&mut state, 30);
        assert_eq!(state.shots.shots_remaining, 2);
    }

    #[test]
    fn test_launch_with_no_shots_is_noop() {
        let mut state = open_level(0);
        assert!(!launch_at(&mut state, 0.5, 80.0));
        assert!(!state.is_ball_moving());
        assert_eq!(state.shots.shots_remaining, 0);
        assert!(!state.drag_begin(Vec2::new(200.0, 400.0)));
    }

    #[test]
    fn test_launch_velocity_uses_mass_and_boost() {
        let mut state = open_level(3);
        // Straight up at full power: impulse 100 * 4 * 2.0 = 800
        assert!(launch_at(&mut state, std::f32::consts::FRAC_PI_2, 250.0));
        let expected = 800.0 / state.ball.mass;
        assert!((state.ball.vel.y - expected).abs() < 0.5);
        assert!(state.ball.vel.x.abs() < 1e-3);
    }

    #[test]
    fn test_gravity_pulls_ball_down() {
        let mut state = open_level(3);
        launch_at(&mut state, 0.0, 10.0);
        let vy0 = state.ball.vel.y;
        run(&mut state, 1);
        assert!(state.ball.vel.y < vy0);
    }

    #[test]
    fn test_screen_edge_half_bounce() {
        let mut state = open_level(3);
        state.ball.state = BallState::Free;
        state.ball.pos = Vec2::new(5.0, 500.0);
        state.ball.vel = Vec2::new(-200.0, 0.0);
        run(&mut state, 1);
        assert_eq!(state.ball.pos.x, state.ball.radius);
        assert!((state.ball.vel.x - 100.0).abs() < 0.1);
        assert!(state.take_events().contains(&GameEvent::Impact));
    }

    #[test]
    fn test_ball_lost_with_shots_resets_silently() {
        let mut state = open_level(3);
        launch_at(&mut state, 0.0, 10.0);
        state.take_events();
        let old_id = state.ball.id;
        state.ball.pos = Vec2::new(200.0, -100.0);
        run(&mut state, 1);

        assert_ne!(state.ball.id, old_id);
        assert!(!state.is_ball_moving());
        assert_eq!(state.ball.pos, state.definition.ball_spawn(state.ball.radius));
        assert_eq!(state.shots.shots_remaining, 2);
        assert_eq!(state.phase, Phase::Idle);
        assert_eq!(state.take_events(), vec![GameEvent::BallReset]);
    }

    #[test]
    fn test_ball_lost_without_shots_is_game_over_once() {
        let mut state = open_level(1);
        launch_at(&mut state, 0.0, 10.0);
        state.take_events();
        state.ball.pos = Vec2::new(200.0, -100.0);
        run(&mut state, 1);
        assert_eq!(state.overlay(), Overlay::GameOver);

        run(&mut state, 600);
        let events = state.take_events();
        assert_eq!(
            events.iter().filter(|e| **e == GameEvent::GameOver).count(),
            1
        );
    }

    #[test]
    fn test_wall_bounce_emits_impact_once() {
        let mut def = LevelCatalog::new(field()).definition_for(1);
        def.walls = vec![WallSpec::new(Vec2::new(200.0, 500.0), Vec2::new(30.0, 200.0), false)];
        def.stars.clear();
        let mut state = LevelState::new(def, field(), ShotTuning::default());

        state.ball.state = BallState::Free;
        state.ball.pos = Vec2::new(170.0, 500.0);
        state.ball.vel = Vec2::new(300.0, 0.0);
        run(&mut state, 1);
        assert!(state.ball.vel.x < 0.0, "ball should bounce back");
        let impacts = state
            .take_events()
            .into_iter()
            .filter(|e| *e == GameEvent::Impact)
            .count();
        assert_eq!(impacts, 1);
    }

    #[test]
    fn test_star_collected_once() {
        let mut state = level(1);
        let star = state.registry.star(0).unwrap().shape.center();
        state.ball.state = BallState::Free;
        state.ball.pos = star;
        state.ball.vel = Vec2::ZERO;
        run(&mut state, 1);
        assert_eq!(state.stars.collected(), 1);

        // Still overlapping on the next tick: no second pickup
        state.ball.pos = star;
        state.ball.vel = Vec2::ZERO;
        run(&mut state, 1);
        assert_eq!(state.stars.collected(), 1);
        let pickups = state
            .take_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::StarCollected { .. }))
            .count();
        assert_eq!(pickups, 1);
    }

    #[test]
    fn test_two_stars_same_tick_each_count_once() {
        let mut def = LevelCatalog::new(field()).definition_for(1);
        def.walls.clear();
        def.stars = vec![Vec2::new(190.0, 500.0), Vec2::new(210.0, 500.0)];
        let mut state = LevelState::new(def, field(), ShotTuning::default());

        for _ in 0..2 {
            state.ball.state = BallState::Free;
            state.ball.pos = Vec2::new(200.0, 500.0);
            state.ball.vel = Vec2::ZERO;
            run(&mut state, 1);
        }

        assert_eq!(state.stars.collected(), 2);
        let pickups: Vec<_> = state
            .take_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::StarCollected { .. }))
            .collect();
        assert_eq!(
            pickups,
            vec![
                GameEvent::StarCollected { index: 0 },
                GameEvent::StarCollected { index: 1 },
            ]
        );
    }

    #[test]
    fn test_star_and_finish_same_tick_star_counts() {
        let mut def = LevelCatalog::new(field()).definition_for(1);
        def.walls.clear();
        // Star overlapping the finish line strip
        def.stars = vec![Vec2::new(380.0, 400.0)];
        let mut state = LevelState::new(def, field(), ShotTuning::default());

        state.ball.state = BallState::Free;
        state.ball.pos = Vec2::new(380.0, 400.0);
        state.ball.vel = Vec2::ZERO;
        run(&mut state, 1);

        assert_eq!(
            state.outcome(),
            Some(Outcome::LevelComplete { stars: 1, coins: 50 })
        );
        assert_eq!(state.stars.collected(), 1);
    }

    #[test]
    fn test_lethal_wall_game_over() {
        let mut state = level(1);
        state.ball.state = BallState::Free;
        // Lethal wall sits at mid-x, 120 above the ground
        state.ball.pos = Vec2::new(200.0, 220.0);
        state.ball.vel = Vec2::ZERO;
        run(&mut state, 1);
        assert_eq!(state.outcome(), Some(Outcome::GameOver));
    }

    #[test]
    fn test_finish_line_completes_with_star_count() {
        let mut state = level(1);
        state.stars.collect(0);
        state.stars.collect(2);
        state.take_events();

        state.ball.state = BallState::Free;
        state.ball.pos = Vec2::new(380.0, 400.0);
        state.ball.vel = Vec2::new(100.0, 0.0);
        run(&mut state, 1);

        assert_eq!(
            state.outcome(),
            Some(Outcome::LevelComplete { stars: 2, coins: 50 })
        );
        run(&mut state, 10);
        let events = state.take_events();
        let terminal: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, GameEvent::LevelComplete { .. } | GameEvent::GameOver))
            .collect();
        assert_eq!(terminal, vec![&GameEvent::LevelComplete { stars: 2, coins: 50 }]);
    }

    #[test]
    fn test_finish_and_lethal_same_tick_only_first_counts() {
        let mut def = LevelCatalog::new(field()).definition_for(1);
        // Lethal wall overlapping the finish line
        def.walls = vec![WallSpec::new(Vec2::new(385.0, 400.0), Vec2::new(30.0, 100.0), true)];
        def.stars.clear();
        let mut state = LevelState::new(def, field(), ShotTuning::default());
        state.ball.state = BallState::Free;
        state.ball.pos = Vec2::new(380.0, 400.0);
        run(&mut state, 1);

        // Walls come before the finish line in registry order
        assert_eq!(state.outcome(), Some(Outcome::GameOver));
        let events = state.take_events();
        assert!(!events.iter().any(|e| matches!(e, GameEvent::LevelComplete { .. })));
    }

    #[test]
    fn test_last_shot_timeout_forces_game_over() {
        let mut state = open_level(1);
        // Gentle lob to the left: never reaches the finish line
        assert!(launch_at(&mut state, std::f32::consts::PI * 0.75, 30.0));
        run(&mut state, 239);
        assert!(!state.is_resolved());
        run(&mut state, 2);
        assert_eq!(state.outcome(), Some(Outcome::GameOver));
    }

    #[test]
    fn test_last_shot_timeout_follows_timestep() {
        let mut state = open_level(1);
        assert!(launch_at(&mut state, std::f32::consts::PI * 0.75, 30.0));
        let input = TickInput::default();
        // Two seconds at 60 Hz is 120 ticks
        for _ in 0..119 {
            tick(&mut state, &input, 1.0 / 60.0);
        }
        assert!(!state.is_resolved());
        for _ in 0..2 {
            tick(&mut state, &input, 1.0 / 60.0);
        }
        assert_eq!(state.outcome(), Some(Outcome::GameOver));
        assert!((state.time - 2.0).abs() < 0.05);
    }

    #[test]
    fn test_restart_cancels_pending_timeout() {
        let mut state = open_level(1);
        launch_at(&mut state, std::f32::consts::PI * 0.75, 30.0);
        assert!(state.last_shot_check.is_scheduled());
        run(&mut state, 100);

        tick(&mut state, &TickInput { restart: true, ..Default::default() }, SIM_DT);
        assert!(!state.last_shot_check.is_scheduled());
        run(&mut state, 400);
        assert!(!state.is_resolved());
    }

    #[test]
    fn test_pause_freezes_ball_and_timer() {
        let mut state = open_level(1);
        launch_at(&mut state, std::f32::consts::PI * 0.75, 30.0);
        run(&mut state, 10);
        let pos = state.ball.pos;
        let ticks = state.time_ticks;
        let time = state.time;

        tick(&mut state, &TickInput { pause: true, ..Default::default() }, SIM_DT);
        run(&mut state, 1000);
        assert_eq!(state.ball.pos, pos);
        assert_eq!(state.time_ticks, ticks);
        assert_eq!(state.time, time);
        assert!(!state.is_resolved());
    }

    #[test]
    fn test_ball_settles_on_ground() {
        let mut state = open_level(3);
        state.ball.state = BallState::Free;
        state.ball.pos = Vec2::new(150.0, 100.0 + state.ball.radius + 1.0);
        state.ball.vel = Vec2::ZERO;
        state.phase = Phase::Flying;
        run(&mut state, 240);
        assert!(!state.is_ball_moving());
        assert_eq!(state.phase, Phase::Idle);
        assert!((state.ball.pos.y - (100.0 + state.ball.radius)).abs() < 1.0);
    }

    #[test]
    fn test_aim_while_flying() {
        let mut state = open_level(3);
        launch_at(&mut state, 1.0, 60.0);
        run(&mut state, 5);
        assert!(state.drag_begin(Vec2::new(200.0, 400.0)));
        assert_eq!(state.phase, Phase::Aiming);
        // Ball keeps flying while aiming
        let pos = state.ball.pos;
        run(&mut state, 1);
        assert_ne!(state.ball.pos, pos);
        assert!(state.drag_end(Vec2::new(180.0, 380.0)));
        assert_eq!(state.shots.shots_remaining, 1);
    }

    proptest! {
        #[test]
        fn prop_shots_never_negative(releases in 0usize..12, budget in 0u32..6) {
            let mut state = open_level(budget);
            let mut fired = 0u32;
            for _ in 0..releases {
                state.drag_begin(Vec2::new(200.0, 400.0));
                if state.drag_end(Vec2::new(150.0, 350.0)) {
                    fired += 1;
                }
                run(&mut state, 3);
            }
            prop_assert_eq!(fired, releases.min(budget as usize) as u32);
            prop_assert_eq!(state.shots.shots_remaining, budget - fired);
        }

        #[test]
        fn prop_at_most_one_terminal_event(x in 20.0f32..380.0, y in 20.0f32..780.0, vx in -400.0f32..400.0, vy in -400.0f32..400.0) {
            let mut state = level(2);
            state.ball.state = BallState::Free;
            state.ball.pos = Vec2::new(x, y);
            state.ball.vel = Vec2::new(vx, vy);
            state.shots.shots_remaining = 0;
            run(&mut state, 900);
            let terminal = state
                .take_events()
                .into_iter()
                .filter(|e| matches!(e, GameEvent::LevelComplete { .. } | GameEvent::GameOver))
                .count();
            prop_assert!(terminal <= 1);
        }
    }
}
