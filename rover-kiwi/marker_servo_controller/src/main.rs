use dora_node_api::arrow::array::Array;
use dora_node_api::{arrow::array::BinaryArray, dora_core::config::DataId, DoraNode, Event};
use eyre::Result;
use marker_servo_lib::{
    init_tracing, ActuationSink, CadenceLimiter, Clock, CycleOutcome, DualAxisControlLoop,
    MonotonicClock, ServoCommandMessage, ServoConfig, ServoContext, StampedTransform,
    TrackingState, TransformBuffer, VelocityCommand,
};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Publishes servo commands on the node's `servo_command` output
struct DoraCommandSink<'a> {
    node: &'a mut DoraNode,
    output: &'a DataId,
}

impl ActuationSink for DoraCommandSink<'_> {
    fn publish(&mut self, command: &VelocityCommand) -> Result<()> {
        send_json(self.node, self.output, &ServoCommandMessage::new(*command))
    }
}

fn send_json<T: Serialize>(node: &mut DoraNode, output: &DataId, value: &T) -> Result<()> {
    let serialized = serde_json::to_vec(value)?;
    let arrow_data = BinaryArray::from_vec(vec![serialized.as_slice()]);
    node.send_output(output.clone(), Default::default(), arrow_data)?;
    Ok(())
}

#[derive(Debug, Default)]
struct CycleStats {
    ticks: u64,
    skipped: u64,
    initializing: u64,
    searching: u64,
    holding: u64,
    commanded: u64,
    publish_failures: u64,
    transforms: u64,
}

impl CycleStats {
    fn record(&mut self, outcome: &CycleOutcome) {
        match outcome.state() {
            TrackingState::Initializing => self.initializing += 1,
            TrackingState::Searching => self.searching += 1,
            TrackingState::Holding => self.holding += 1,
            TrackingState::Tracking => self.commanded += 1,
        }
    }
}

fn log_transition(previous: Option<TrackingState>, outcome: &CycleOutcome) {
    let state = outcome.state();
    if previous == Some(state) {
        return;
    }

    match outcome {
        CycleOutcome::Initializing { remaining } => {
            info!("Initializing... waiting {:.1}s for the marker detector", remaining)
        }
        CycleOutcome::TargetNotFound => info!("No marker found, looking for one..."),
        CycleOutcome::Suppressed { .. } => debug!("Marker visible, holding last command"),
        CycleOutcome::Commanded { errors, .. } => info!(
            "Marker acquired: deviation {:.4} m, {:.4} m",
            errors.longitudinal, errors.lateral
        ),
    }
}

fn main() -> Result<()> {
    let _guard = init_tracing();

    info!("Starting marker servo controller node");

    let config = ServoConfig::from_env()?;
    info!("Marker Servo Configuration:");
    info!("  Frames: {} -> {}", config.reference_frame, config.target_frame);
    info!(
        "  Longitudinal PID: Kp={}, Ki={}, Kd={}, window={}",
        config.longitudinal.kp, config.longitudinal.ki, config.longitudinal.kd, config.longitudinal.ks
    );
    info!(
        "  Lateral PID: Kp={}, Ki={}, Kd={}, window={}",
        config.lateral.kp, config.lateral.ki, config.lateral.kd, config.lateral.ks
    );
    info!("  Warm-up: {}s, period: {}s", config.warmup_delay, config.period);
    if let Some(max_age) = config.transform_max_age {
        info!("  Marker considered lost after {}s without a transform", max_age);
    }

    let clock = MonotonicClock::new();
    let mut controller = DualAxisControlLoop::new(&config, clock.now())?;
    let mut transforms = TransformBuffer::new(config.transform_max_age);

    let (mut node, mut events) = DoraNode::init_from_env()?;
    let command_output = DataId::from("servo_command".to_owned());
    let telemetry_output = DataId::from("servo_telemetry".to_owned());

    let mut stats = CycleStats::default();
    let mut cadence = CadenceLimiter::new(config.period);
    let mut last_state: Option<TrackingState> = None;

    while let Some(event) = events.recv() {
        match event {
            Event::Input { id, data, metadata: _ } => match id.as_str() {
                "tick" => {
                    stats.ticks += 1;

                    // Hold the configured cadence even if the timer fires faster
                    if !cadence.ready(clock.now()) {
                        stats.skipped += 1;
                        continue;
                    }

                    let result = {
                        let mut sink = DoraCommandSink {
                            node: &mut node,
                            output: &command_output,
                        };
                        let mut ctx = ServoContext {
                            clock: &clock,
                            poses: &transforms,
                            sink: &mut sink,
                        };
                        controller.tick(&mut ctx)
                    };

                    let outcome = match result {
                        Ok(outcome) => outcome,
                        Err(e) => {
                            stats.publish_failures += 1;
                            warn!("Failed to publish servo command: {}", e);
                            continue;
                        }
                    };

                    stats.record(&outcome);
                    log_transition(last_state, &outcome);
                    last_state = Some(outcome.state());

                    if let Err(e) = send_json(&mut node, &telemetry_output, &outcome.to_telemetry()) {
                        warn!("Failed to publish servo telemetry: {}", e);
                    }
                }
                "marker_transform" => {
                    let Some(array) = data.as_any().downcast_ref::<BinaryArray>() else {
                        warn!("marker_transform input is not a binary array");
                        continue;
                    };

                    for row in 0..array.len() {
                        let mut stamped: StampedTransform = match serde_json::from_slice(array.value(row)) {
                            Ok(t) => t,
                            Err(e) => {
                                warn!("Failed to deserialize StampedTransform: {}", e);
                                continue;
                            }
                        };

                        stamped.stamp = clock.now();
                        if transforms.insert(stamped) {
                            stats.transforms += 1;
                        }
                    }
                }
                other => {
                    warn!("Unexpected input: {}", other);
                }
            },
            Event::InputClosed { id } => {
                info!("Input {} closed", id);
                if id.as_str() == "tick" {
                    break;
                }
            }
            Event::Stop(_) => {
                info!("Received stop event");
                break;
            }
            other => {
                debug!("Other event type: {:?}", other);
            }
        }
    }

    info!("Marker servo controller stopping");
    info!("  Ticks: {} ({} skipped for cadence)", stats.ticks, stats.skipped);
    info!(
        "  Cycles: {} initializing, {} searching, {} holding, {} commanded",
        stats.initializing, stats.searching, stats.holding, stats.commanded
    );
    info!("  Transforms received: {}", stats.transforms);
    if stats.publish_failures > 0 {
        warn!("  Command publish failures: {}", stats.publish_failures);
    }

    Ok(())
}
