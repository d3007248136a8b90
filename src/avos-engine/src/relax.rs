// Copyright 2026 The A-VO-S Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Layout relaxation.
//!
//! Every node starts at its anchor and is simulated for a fixed number of
//! ticks under four forces, applied in this order each tick:
//!
//! 1. many-body repulsion between every pair of nodes,
//! 2. a per-axis spring towards the node's anchor,
//! 3. collision, keeping padded node circles apart,
//! 4. a weak radial spring towards the node's band radius.
//!
//! Alpha decays geometrically from `alpha` towards `alpha_target`, and the
//! tick count is derived from the decay schedule rather than from
//! convergence, so a run always does the same amount of work. The only
//! randomness is the jiggle that separates exactly coincident nodes, drawn
//! from a seeded generator, so identical inputs give identical outputs.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

use crate::config::SimulationConfig;
use crate::datamodel::NodePosition;
use crate::geometry::Position;

/// Input to the relaxer: where a node wants to be and how big it is.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnchoredPoint {
    pub anchor: Position,
    /// Distance from the center the radial spring pulls towards.
    pub target_radius: f64,
    /// Visual radius of the node.
    pub size: f64,
}

/// Simulation state for one node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub anchor: Position,
    pub target_radius: f64,
    pub size: f64,
}

impl Particle {
    fn at_anchor(point: &AnchoredPoint) -> Self {
        Self {
            x: point.anchor.x,
            y: point.anchor.y,
            vx: 0.0,
            vy: 0.0,
            anchor: point.anchor,
            target_radius: point.target_radius,
            size: point.size,
        }
    }
}

/// Tiny random offsets used wherever two nodes coincide exactly and a
/// direction would otherwise be undefined.
pub struct Jiggle {
    rng: StdRng,
}

impl Jiggle {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn next(&mut self) -> f64 {
        (self.rng.random::<f64>() - 0.5) * 1e-6
    }
}

/// A force adjusts particle velocities; positions move only when the
/// simulation integrates at the end of the tick.
pub trait Force {
    fn apply(&self, particles: &mut [Particle], alpha: f64, jiggle: &mut Jiggle);
}

/// Constant-strength interaction between every pair of nodes, falling off
/// with distance. Negative strength repels.
pub struct ManyBody {
    pub strength: f64,
    pub distance_min: f64,
}

impl Force for ManyBody {
    fn apply(&self, particles: &mut [Particle], alpha: f64, jiggle: &mut Jiggle) {
        let distance_min2 = self.distance_min * self.distance_min;
        for i in 0..particles.len() {
            let (xi, yi) = (particles[i].x, particles[i].y);
            let mut dvx = 0.0;
            let mut dvy = 0.0;
            for (j, other) in particles.iter().enumerate() {
                if i == j {
                    continue;
                }
                let mut x = other.x - xi;
                let mut y = other.y - yi;
                let mut l = x * x + y * y;
                if x == 0.0 {
                    x = jiggle.next();
                    l += x * x;
                }
                if y == 0.0 {
                    y = jiggle.next();
                    l += y * y;
                }
                if l < distance_min2 {
                    l = (distance_min2 * l).sqrt();
                }
                dvx += x * self.strength * alpha / l;
                dvy += y * self.strength * alpha / l;
            }
            particles[i].vx += dvx;
            particles[i].vy += dvy;
        }
    }
}

/// Spring towards the anchor, independent on each axis.
pub struct AnchorSpring {
    pub strength: f64,
}

impl Force for AnchorSpring {
    fn apply(&self, particles: &mut [Particle], alpha: f64, _jiggle: &mut Jiggle) {
        for p in particles.iter_mut() {
            p.vx += (p.anchor.x - p.x) * self.strength * alpha;
            p.vy += (p.anchor.y - p.y) * self.strength * alpha;
        }
    }
}

/// Pushes apart nodes whose padded circles would overlap after this tick.
/// Not scaled by alpha, so it still acts once the other forces have died
/// down.
pub struct Collide {
    /// Collision radius as a multiple of the node size.
    pub padding: f64,
    pub strength: f64,
    pub iterations: usize,
}

impl Force for Collide {
    fn apply(&self, particles: &mut [Particle], _alpha: f64, jiggle: &mut Jiggle) {
        let n = particles.len();
        for _ in 0..self.iterations {
            for i in 0..n {
                let ri = particles[i].size * self.padding;
                let ri2 = ri * ri;
                let xi = particles[i].x + particles[i].vx;
                let yi = particles[i].y + particles[i].vy;
                for j in (i + 1)..n {
                    let other = particles[j];
                    let rj = other.size * self.padding;
                    let r = ri + rj;
                    let mut x = xi - other.x - other.vx;
                    let mut y = yi - other.y - other.vy;
                    let mut l = x * x + y * y;
                    if l >= r * r {
                        continue;
                    }
                    if x == 0.0 {
                        x = jiggle.next();
                        l += x * x;
                    }
                    if y == 0.0 {
                        y = jiggle.next();
                        l += y * y;
                    }
                    let d = l.sqrt();
                    let k = (r - d) / d * self.strength;
                    x *= k;
                    y *= k;
                    // the smaller node moves more
                    let rj2 = rj * rj;
                    let share = rj2 / (ri2 + rj2);
                    particles[i].vx += x * share;
                    particles[i].vy += y * share;
                    particles[j].vx -= x * (1.0 - share);
                    particles[j].vy -= y * (1.0 - share);
                }
            }
        }
    }
}

/// Spring towards a circle of the node's target radius around the center.
pub struct Radial {
    pub strength: f64,
}

impl Force for Radial {
    fn apply(&self, particles: &mut [Particle], alpha: f64, _jiggle: &mut Jiggle) {
        for p in particles.iter_mut() {
            let dx = if p.x == 0.0 { 1e-6 } else { p.x };
            let dy = if p.y == 0.0 { 1e-6 } else { p.y };
            let r = (dx * dx + dy * dy).sqrt();
            let k = (p.target_radius - r) * self.strength * alpha / r;
            p.vx += dx * k;
            p.vy += dy * k;
        }
    }
}

struct Simulation<'a> {
    config: &'a SimulationConfig,
    forces: Vec<Box<dyn Force>>,
    jiggle: Jiggle,
    alpha: f64,
}

impl<'a> Simulation<'a> {
    fn new(config: &'a SimulationConfig) -> Self {
        let forces: Vec<Box<dyn Force>> = vec![
            Box::new(ManyBody {
                strength: config.charge_strength,
                distance_min: config.distance_min,
            }),
            Box::new(AnchorSpring {
                strength: config.axis_strength,
            }),
            Box::new(Collide {
                padding: config.collide_padding,
                strength: config.collide_strength,
                iterations: config.collide_iterations,
            }),
            Box::new(Radial {
                strength: config.radial_strength,
            }),
        ];
        Self {
            config,
            forces,
            jiggle: Jiggle::new(config.jiggle_seed),
            alpha: config.alpha,
        }
    }

    fn tick(&mut self, particles: &mut [Particle]) {
        self.alpha += (self.config.alpha_target - self.alpha) * self.config.alpha_decay;
        for force in &self.forces {
            force.apply(particles, self.alpha, &mut self.jiggle);
        }
        let keep = 1.0 - self.config.velocity_decay;
        for p in particles.iter_mut() {
            p.vx *= keep;
            p.vy *= keep;
            p.x += p.vx;
            p.y += p.vy;
        }
    }
}

/// Relax anchored points into final positions, index-aligned with `points`.
pub fn relax(points: &[AnchoredPoint], config: &SimulationConfig) -> Vec<NodePosition> {
    match points {
        [] => return Vec::new(),
        [only] => {
            return vec![NodePosition {
                x: only.anchor.x,
                y: only.anchor.y,
                size: only.size,
            }];
        }
        _ => {}
    }

    let mut particles: Vec<Particle> = points.iter().map(Particle::at_anchor).collect();
    let mut sim = Simulation::new(config);
    let ticks = config.iterations();
    for _ in 0..ticks {
        sim.tick(&mut particles);
    }

    debug!(nodes = particles.len(), ticks, alpha = sim.alpha, "relaxed layout");

    particles
        .iter()
        .map(|p| NodePosition {
            x: p.x,
            y: p.y,
            size: p.size,
        })
        .collect()
}
