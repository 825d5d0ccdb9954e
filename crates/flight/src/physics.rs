use skylark_shared::*;

/// Advances a [`BirdState`] by one tick. Holds no mutable state of its own,
/// so the same state, command and dt always produce the same result.
pub struct FlightIntegrator {
    config: FlightConfig,
}

impl FlightIntegrator {
    pub fn new(config: FlightConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FlightConfig {
        &self.config
    }

    /// One integration step. Order is fixed: command forces, passive forces,
    /// integration, ground clamp, final clamps. Every rate scales by dt.
    pub fn tick(&self, bird: &mut BirdState, command: &FlightCommand, dt: f32) {
        let c = &self.config;
        let dt = dt.clamp(0.0, c.max_dt);
        if dt <= 0.0 {
            return;
        }
        let was_airborne = bird.height > 0.0;

        // Command forces. An energy-backed wing impulse carries the bird for
        // this step, so gravity is skipped while one fires.
        let mut winged = false;
        let mut gliding = false;
        match command.vertical {
            VerticalCommand::Idle => {}
            VerticalCommand::Glide => {
                gliding = true;
                bird.vertical_momentum += c.lift_factor * bird.speed * dt;
            }
            VerticalCommand::Dive { intensity } => {
                let i = intensity.clamp(0.0, 1.0);
                bird.speed += c.dive_accel * i * dt;
                bird.vertical_momentum -= c.dive_drop * i * dt;
            }
            VerticalCommand::Flap { intensity } => {
                let i = intensity.clamp(0.0, 1.0);
                if bird.energy >= c.min_flap_energy {
                    // Tired wings deliver less and cost less; sustained
                    // flapping settles where recovery balances the drain.
                    let effective = i * bird.energy;
                    bird.vertical_momentum += c.flap_strength * effective * dt;
                    bird.speed += c.flap_thrust * effective * dt;
                    bird.energy -= c.flap_energy_cost * effective * dt;
                    winged = true;
                }
            }
            VerticalCommand::GainHeight { intensity } => {
                let i = intensity.clamp(0.0, 1.0);
                if bird.energy >= c.min_flap_energy {
                    let effective = i * bird.energy;
                    bird.vertical_momentum += c.flap_strength * c.climb_bias * effective * dt;
                    bird.speed += c.flap_thrust * c.climb_thrust_scale * effective * dt;
                    bird.energy -= c.flap_energy_cost * effective * dt;
                    winged = true;
                }
            }
        }

        // Turn rate chases the commanded target, or relaxes when released.
        match command.turn {
            Some(turn) => {
                let target = turn.direction.sign() * c.max_turn_rate * turn.intensity.clamp(0.0, 1.0);
                let blend = (c.turn_responsiveness * dt).min(1.0);
                bird.turn_rate += (target - bird.turn_rate) * blend;
            }
            None => {
                bird.turn_rate *= 1.0 - c.turn_decay * dt;
            }
        }

        // Passive forces.
        if !winged {
            bird.vertical_momentum -= c.gravity * dt;
        }
        bird.speed *= 1.0 - c.drag * dt;
        bird.speed *= 1.0 - c.turn_bleed * bird.turn_rate.abs() * dt;
        bird.vertical_momentum *= 1.0 - c.momentum_decay * dt;
        bird.energy = (bird.energy + c.energy_recovery * dt).min(1.0);
        if gliding {
            // The sink floor caps the net fall rate after gravity and decay,
            // which is what makes a glide a glide.
            bird.vertical_momentum = bird.vertical_momentum.max(c.glide_sink_floor);
        }

        // Integrate.
        bird.height += bird.vertical_momentum * dt;
        bird.yaw += bird.turn_rate * dt;
        let bank_target = bird.turn_rate / c.max_turn_rate;
        bird.bank += (bank_target - bird.bank) * (c.bank_rate * dt).min(1.0);

        // Ground clamp. Friction applies once per touchdown, not every
        // grounded tick.
        if bird.height <= 0.0 {
            bird.height = 0.0;
            if bird.vertical_momentum < 0.0 {
                bird.vertical_momentum = 0.0;
            }
            if was_airborne {
                bird.speed *= c.ground_friction;
            }
        }

        // Final clamps.
        bird.speed = bird.speed.clamp(0.0, c.max_speed);
        bird.energy = bird.energy.clamp(0.0, 1.0);
    }
}
