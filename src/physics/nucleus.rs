use glam::DVec2;
use log::trace;
use std::f64::consts::{PI, TAU};

// Fixed orientations for the small nuclei. Arbitrary, but layouts elsewhere
// are compared against them coordinate for coordinate.
const TWO_NUCLEON_ANGLE: f64 = 0.4 * PI;
const THREE_NUCLEON_ANGLE: f64 = 1.4 * PI;
const THREE_NUCLEON_SPREAD: f64 = 1.155;
const FOUR_NUCLEON_ANGLE: f64 = 2.8 * PI;

// Ring spacing scale, mapped linearly from (radius 3 -> 2.4) to (radius 10 -> 1.35).
const RING_SCALE_SMALL: (f64, f64) = (3.0, 2.4);
const RING_SCALE_LARGE: (f64, f64) = (10.0, 1.35);
const RING_ANGLE_OFFSET: f64 = 0.2 * TAU;

/// Nucleon radius at which the extrapolated ring scale reaches zero.
pub const MAX_NUCLEON_RADIUS: f64 = RING_SCALE_SMALL.0
    + RING_SCALE_SMALL.1 * (RING_SCALE_LARGE.0 - RING_SCALE_SMALL.0)
        / (RING_SCALE_SMALL.1 - RING_SCALE_LARGE.1);

/// Target of one nucleon: where it should go and in which draw layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NucleonPlacement {
    pub destination: DVec2,
    pub layer: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NucleusLayout {
    pub placements: Vec<NucleonPlacement>,
    pub radius: f64,
}

/// Orders nucleons so that neutrons are spread between protons instead of
/// clumping: roughly `neutrons / protons` neutrons precede each proton.
pub fn interleave<T: Clone>(protons: &[T], neutrons: &[T]) -> Vec<T> {
    let total = protons.len() + neutrons.len();
    let mut nucleons = Vec::with_capacity(total);
    if protons.is_empty() {
        nucleons.extend_from_slice(neutrons);
        return nucleons;
    }

    let neutrons_per_proton = neutrons.len() as f64 / protons.len() as f64;
    let mut neutrons_owed = 0.0;
    let (mut proton_index, mut neutron_index) = (0, 0);
    while nucleons.len() < total {
        neutrons_owed += neutrons_per_proton;
        while neutrons_owed >= 1.0 && neutron_index < neutrons.len() {
            nucleons.push(neutrons[neutron_index].clone());
            neutron_index += 1;
            neutrons_owed -= 1.0;
        }
        if proton_index < protons.len() {
            nucleons.push(protons[proton_index].clone());
            proton_index += 1;
        }
    }
    nucleons
}

/// Packs nucleons of a fixed radius into a compact, jitter-free cluster.
///
/// The result only depends on the nucleon count, the center and the radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NucleonConfigurator {
    nucleon_radius: f64,
}

impl NucleonConfigurator {
    pub const fn new(nucleon_radius: f64) -> Self {
        Self { nucleon_radius }
    }

    pub fn nucleon_radius(&self) -> f64 {
        self.nucleon_radius
    }

    pub fn layout(&self, count: usize, center: DVec2) -> NucleusLayout {
        let r = self.nucleon_radius;
        let at = |distance: f64, angle: f64, layer: u32| NucleonPlacement {
            destination: center + DVec2::new(angle.cos(), angle.sin()) * distance,
            layer,
        };

        match count {
            0 => NucleusLayout {
                placements: Vec::new(),
                radius: r,
            },
            1 => NucleusLayout {
                placements: vec![NucleonPlacement {
                    destination: center,
                    layer: 0,
                }],
                radius: r,
            },
            2 => NucleusLayout {
                placements: vec![
                    at(r, TWO_NUCLEON_ANGLE, 0),
                    at(r, TWO_NUCLEON_ANGLE + PI, 0),
                ],
                radius: 2.0 * r,
            },
            3 => {
                let spread = r * THREE_NUCLEON_SPREAD;
                let placements = (0..3)
                    .map(|i| at(spread, THREE_NUCLEON_ANGLE + i as f64 * TAU / 3.0, 0))
                    .collect();
                NucleusLayout {
                    placements,
                    radius: spread + r,
                }
            }
            4 => {
                let (sin, cos) = FOUR_NUCLEON_ANGLE.sin_cos();
                let axis = DVec2::new(cos, sin);
                let across = DVec2::new(sin, -cos);
                let spread = r * 2.0 * (PI / 3.0).cos();
                NucleusLayout {
                    placements: vec![
                        NucleonPlacement {
                            destination: center + axis * r,
                            layer: 0,
                        },
                        NucleonPlacement {
                            destination: center + across * spread,
                            layer: 1,
                        },
                        NucleonPlacement {
                            destination: center - axis * r,
                            layer: 0,
                        },
                        NucleonPlacement {
                            destination: center - across * spread,
                            layer: 1,
                        },
                    ],
                    radius: spread + r,
                }
            }
            _ => self.ring_layout(count, center),
        }
    }

    /// Radius of the nucleus a layout of `count` nucleons would produce.
    pub fn radius(&self, count: usize) -> f64 {
        self.layout(count, DVec2::ZERO).radius
    }

    /// Spiral of concentric rings, each ring one draw layer above the last.
    fn ring_layout(&self, count: usize, center: DVec2) -> NucleusLayout {
        let r = self.nucleon_radius;
        let scale = ring_scale_factor(r);
        let mut placements = Vec::with_capacity(count);

        let mut ring_radius = 0.0;
        let mut last_radius = 0.0;
        let mut left_in_ring: usize = 1;
        let mut level: u32 = 0;
        let mut angle: f64 = 0.0;
        let mut angle_step: f64 = 0.0;

        for _ in 0..count {
            placements.push(NucleonPlacement {
                destination: center + DVec2::new(angle.cos(), angle.sin()) * ring_radius,
                layer: level,
            });
            last_radius = ring_radius;
            left_in_ring -= 1;
            if left_in_ring > 0 {
                angle += angle_step;
            } else {
                level += 1;
                ring_radius += r * scale / f64::from(level);
                angle += RING_ANGLE_OFFSET + f64::from(level) * PI;
                // A tiny scale can round the capacity down to nothing; keep one per ring.
                left_in_ring = ((ring_radius * PI / r).floor() as usize).max(1);
                angle_step = TAU / left_in_ring as f64;
                trace!("nucleus ring {level}: radius {ring_radius:.3}, capacity {left_in_ring}");
            }
        }

        NucleusLayout {
            placements,
            radius: last_radius + r,
        }
    }
}

/// Ring spacing multiplier for `nucleon_radius`.
///
/// Calibrated for radii 3 to 10 and extrapolated linearly outside; it reaches
/// zero at [`MAX_NUCLEON_RADIUS`], above which rings would collapse inwards.
pub fn ring_scale_factor(nucleon_radius: f64) -> f64 {
    let (x0, y0) = RING_SCALE_SMALL;
    let (x1, y1) = RING_SCALE_LARGE;
    y0 + (nucleon_radius - x0) * (y1 - y0) / (x1 - x0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;
    const R: f64 = 3.0;

    fn configurator() -> NucleonConfigurator {
        NucleonConfigurator::new(R)
    }

    #[test]
    fn interleave_spreads_neutrons_between_protons() {
        let order = interleave(&['p', 'p'], &['n', 'n', 'n', 'n']);
        assert_eq!(order, vec!['n', 'n', 'p', 'n', 'n', 'p']);

        let order = interleave(&['p', 'p', 'p', 'p'], &['n', 'n']);
        assert_eq!(order, vec!['p', 'n', 'p', 'p', 'n', 'p']);

        assert_eq!(interleave(&[], &['n', 'n']), vec!['n', 'n']);
        assert_eq!(interleave::<char>(&[], &[]), Vec::<char>::new());
    }

    #[test]
    fn interleave_keeps_insertion_order_per_kind() {
        let protons = [1, 2, 3, 4, 5];
        let neutrons = [10, 20, 30, 40, 50];
        let order = interleave(&protons, &neutrons);
        assert_eq!(order, vec![10, 1, 20, 2, 30, 3, 40, 4, 50, 5]);
    }

    #[test]
    fn empty_and_single_nucleus() {
        let center = DVec2::new(10.0, -4.0);
        let empty = configurator().layout(0, center);
        assert!(empty.placements.is_empty());
        assert_eq!(empty.radius, R);

        let single = configurator().layout(1, center);
        assert_eq!(single.placements[0].destination, center);
        assert_eq!(single.radius, R);
    }

    #[test]
    fn two_nucleons_touch_at_the_center() {
        let center = DVec2::new(1.0, 2.0);
        let layout = configurator().layout(2, center);
        let [a, b] = [layout.placements[0], layout.placements[1]];
        assert!((a.destination.distance(center) - R).abs() < EPS);
        assert!((b.destination.distance(center) - R).abs() < EPS);
        assert!(((a.destination + b.destination) / 2.0 - center).length() < EPS);
        assert_eq!((a.layer, b.layer), (0, 0));
        assert!((layout.radius - 2.0 * R).abs() < EPS);
    }

    #[test]
    fn three_nucleons_form_an_equilateral_triangle() {
        let layout = configurator().layout(3, DVec2::ZERO);
        let side = R * THREE_NUCLEON_SPREAD * 2.0 * (PI / 3.0).sin();
        let p = &layout.placements;
        for (i, j) in [(0, 1), (1, 2), (2, 0)] {
            assert!((p[i].destination.distance(p[j].destination) - side).abs() < EPS);
        }
        assert!((layout.radius - (R * 1.155 + R)).abs() < EPS);
    }

    #[test]
    fn four_nucleons_make_a_diamond_on_two_layers() {
        let layout = configurator().layout(4, DVec2::ZERO);
        let spread = R * 2.0 * (PI / 3.0).cos();
        let p = &layout.placements;
        assert!((p[0].destination.length() - R).abs() < EPS);
        assert!((p[2].destination.length() - R).abs() < EPS);
        assert!((p[1].destination.length() - spread).abs() < EPS);
        assert!(p[0].destination.dot(p[1].destination).abs() < EPS);
        assert_eq!(
            p.iter().map(|placement| placement.layer).collect::<Vec<_>>(),
            vec![0, 1, 0, 1]
        );
        assert!((layout.radius - (spread + R)).abs() < EPS);
    }

    #[test]
    fn rings_grow_outwards_with_increasing_layers() {
        let layout = configurator().layout(10, DVec2::ZERO);
        assert_eq!(layout.placements.len(), 10);
        assert_eq!(layout.placements[0].destination, DVec2::ZERO);
        for pair in layout.placements.windows(2) {
            assert!(pair[1].layer >= pair[0].layer);
            if pair[1].layer > pair[0].layer {
                assert!(pair[1].destination.length() > pair[0].destination.length());
            }
        }
        // First ring at 7.2 holds floor(7.2 * pi / 3) = 7, the rest spill over.
        let first_ring = layout.placements.iter().filter(|p| p.layer == 1).count();
        assert_eq!(first_ring, 7);
        assert_eq!(layout.placements[9].layer, 2);
        assert!(layout.radius > configurator().radius(4));
        assert!((layout.radius - (R * 2.4 + R * 2.4 / 2.0 + R)).abs() < EPS);
    }

    #[test]
    fn layout_is_deterministic() {
        let center = DVec2::new(-3.5, 8.25);
        for count in 0..40 {
            assert_eq!(
                configurator().layout(count, center),
                configurator().layout(count, center)
            );
        }
    }

    #[test]
    fn scale_factor_hits_both_calibration_points() {
        assert!((ring_scale_factor(3.0) - 2.4).abs() < EPS);
        assert!((ring_scale_factor(10.0) - 1.35).abs() < EPS);
        assert!(ring_scale_factor(MAX_NUCLEON_RADIUS).abs() < EPS);
        assert!(ring_scale_factor(MAX_NUCLEON_RADIUS - 0.5) > 0.0);
    }

    #[test]
    fn rings_use_float_angles_for_large_nuclei() {
        let layout = configurator().layout(60, DVec2::new(5.0, 5.0));
        assert_eq!(layout.placements.len(), 60);
        assert!(layout.placements.iter().all(|p| p.destination.is_finite()));
        assert!(layout.radius > configurator().radius(10));
    }
}
