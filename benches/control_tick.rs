use bevy::{input::keyboard::KeyCode, math::Vec2};
use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use first_person_input::prelude::*;
use std::time::Duration;

const WIDTH: f32 = 1920.0;
const TAP: Duration = Duration::from_millis(120);

fn idle_controller() -> FirstPersonController {
    let mut controller = FirstPersonController::new(ControllerSettings::default(), WIDTH);
    controller.mouse.on_capture_changed(true);
    controller.on_focus_changed(true);
    controller
}

/// Every source wants both channels, so every tick samples everything
fn busy_controller() -> FirstPersonController {
    let mut controller = idle_controller();

    for key in [KeyCode::KeyW, KeyCode::KeyD, KeyCode::ArrowLeft] {
        controller.keyboard.on_key_down(key, false);
    }

    for (id, x) in [(0, 100.0), (1, 300.0), (2, 1700.0), (3, 1500.0)] {
        let origin = Vec2::new(x, 500.0);
        controller
            .touch
            .on_contact_start(ContactId(id), origin, Duration::ZERO);
        controller
            .touch
            .on_contact_move(ContactId(id), origin + Vec2::new(40.0, -40.0));
    }

    controller.update(&mut Vec::new());
    controller
}

fn tick(controller: &mut FirstPersonController, indicators: &mut Vec<IndicatorEvent>) {
    controller.mouse.on_move(3.0, -2.0);
    controller.update(indicators);
    indicators.clear();
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut indicators = Vec::new();

    let mut controller = idle_controller();
    c.bench_function("idle_tick", |b| {
        b.iter(|| tick(&mut controller, &mut indicators))
    });

    let mut controller = busy_controller();
    c.bench_function("busy_tick", |b| {
        b.iter(|| tick(&mut controller, &mut indicators))
    });

    c.bench_function("drag_classification", |b| {
        b.iter_batched(
            idle_controller,
            |mut controller| {
                let origin = Vec2::new(WIDTH / 2.0, 500.0);
                controller
                    .touch
                    .on_contact_start(ContactId(0), origin, Duration::ZERO);
                controller
                    .touch
                    .on_contact_move(ContactId(0), origin + Vec2::new(-30.0, 5.0));
                controller.touch.on_contact_end(ContactId(0), TAP)
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
