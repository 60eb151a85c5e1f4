use argh::FromArgs;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;

use rigid_align::{
    metrics::{rmse, rotation_angle_between},
    transforms::{random_rotation, random_translation},
    DVec3, PointSet, RigidTransform,
};

#[derive(FromArgs)]
/// Recover a random rigid transform from a synthetic point cloud
struct Args {
    /// number of points in the cloud
    #[argh(option, default = "453")]
    num_points: usize,

    /// seed of the random generator
    #[argh(option, default = "1234")]
    seed: u64,

    /// scale of the random translation components
    #[argh(option, default = "10.0")]
    translation_scale: f64,

    /// half-width of the uniform noise added to the target points
    #[argh(option, default = "0.0")]
    noise: f64,

    /// print the report as JSON
    #[argh(switch)]
    json: bool,
}

#[derive(Serialize)]
struct Report {
    num_points: usize,
    seed: u64,
    noise: f64,
    actual: RigidTransform,
    estimated: RigidTransform,
    rotation_error: f64,
    translation_error: f64,
    rmse: f64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let mut rng = StdRng::seed_from_u64(args.seed);

    // anisotropic ellipsoid, avoids a nearly symmetric cloud
    let source = (0..args.num_points)
        .map(|_| {
            let p = loop {
                let p = DVec3::new(
                    rng.random_range(-1.0..1.0),
                    rng.random_range(-1.0..1.0),
                    rng.random_range(-1.0..1.0),
                );
                if p.length_squared() <= 1.0 {
                    break p;
                }
            };
            p * DVec3::new(3.0, 2.0, 1.0)
        })
        .collect::<Vec<_>>();
    let source = PointSet::new(source);

    let actual = RigidTransform::new(
        random_rotation(&mut rng),
        random_translation(&mut rng, args.translation_scale),
    );

    let target = actual.apply_all(&source);
    let target = if args.noise > 0.0 {
        let noisy = target
            .iter()
            .map(|&p| {
                p + DVec3::new(
                    rng.random_range(-args.noise..args.noise),
                    rng.random_range(-args.noise..args.noise),
                    rng.random_range(-args.noise..args.noise),
                )
            })
            .collect::<Vec<_>>();
        PointSet::new(noisy)
    } else {
        target
    };
    log::info!("Generated {} correspondences", source.len());

    let estimated = rigid_align::solve(&source, &target)?;

    let report = Report {
        num_points: source.len(),
        seed: args.seed,
        noise: args.noise,
        actual,
        estimated,
        rotation_error: rotation_angle_between(&actual.rotation, &estimated.rotation),
        translation_error: (actual.translation - estimated.translation).length(),
        rmse: rmse(&source, &target, &estimated)?,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Arun rigid registration");
    println!("=======================\n");
    println!("Points: {} (seed {}, noise {})", report.num_points, report.seed, report.noise);

    println!("\nActual rotation:\n{}", actual.rotation);
    println!("Actual translation: {}", actual.translation);

    println!("\nEstimated rotation:\n{}", estimated.rotation);
    println!("Estimated translation: {}", estimated.translation);

    println!("\nError metrics:");
    println!("Rotation error: {:e} rad", report.rotation_error);
    println!("Translation error: {:e}", report.translation_error);
    println!("RMSE: {:e}", report.rmse);

    Ok(())
}
