use glam::DVec2;
use log::{error, info};
use particle_atom::{AtomConfig, AtomResult, Particle, ParticleAtom, ParticleKind};

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        error!("{e}");
        std::process::exit(1);
    }
}

/// Builds carbon-12 one particle at a time and prints where everything lands.
fn run() -> AtomResult<()> {
    let atom = ParticleAtom::new(AtomConfig::default())?;
    atom.set_position(DVec2::new(400.0, 300.0));

    for _ in 0..6 {
        atom.add_particle(Particle::new(ParticleKind::Proton, DVec2::new(0.0, 0.0)))?;
        atom.add_particle(Particle::new(ParticleKind::Neutron, DVec2::new(800.0, 0.0)))?;
        atom.add_particle(Particle::new(ParticleKind::Electron, DVec2::new(400.0, 600.0)))?;
    }
    atom.move_all_particles_to_destination();

    info!("{:?}", atom.snapshot());
    for (kind, collection) in [
        (ParticleKind::Proton, atom.protons()),
        (ParticleKind::Neutron, atom.neutrons()),
        (ParticleKind::Electron, atom.electrons()),
    ] {
        for particle in collection.to_vec() {
            let position = particle.position();
            println!(
                "{kind:<8} #{:<3} layer {} at ({:8.3}, {:8.3})",
                particle.id(),
                particle.z_layer(),
                position.x,
                position.y
            );
        }
    }
    println!(
        "charge {}, mass number {}, nucleus radius {:.3}",
        atom.charge(),
        atom.weight(),
        atom.nucleus_radius()
    );
    Ok(())
}
