use shift_field::decompose::{decompose, OrientationField};
use shift_field::grid::{Grid2D, Sampling};
use shift_field::shift::{LocalShiftFinder, ShiftParams};
use shift_field::whiten::whiten;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Demo stub: synthetic target pattern shifted by one sample, pushed
    // through whitening, estimation, and decomposition.
    let n1 = 120usize;
    let n2 = 120usize;
    let s1 = Sampling::unit(n1);
    let s2 = Sampling::unit(n2);
    let target = |i1: usize, i2: usize| {
        let d1 = i1 as f32 - n1 as f32 / 2.0;
        let d2 = i2 as f32 - n2 as f32 / 2.0;
        10.0 * (0.3 * (d1 * d1 + d2 * d2).sqrt()).sin()
    };
    let f = Grid2D::from_fn(s1, s2, target);
    let g = Grid2D::from_fn(s1, s2, |i1, i2| target(i1.saturating_sub(1), i2));

    let fw = whiten(12.0, &f)?;
    let gw = whiten(12.0, &g)?;
    let finder = LocalShiftFinder::new(ShiftParams::default())?;
    let uv = finder.estimate(&fw, &gw)?;

    let orientation = OrientationField::constant_dip(&f, 40f32.to_radians());
    let dec = decompose(5.0, &uv.u1, &uv.u2, &orientation)?;

    let mid = (n1 / 2, n2 / 2);
    println!(
        "u1={:+.3} u2={:+.3} axial={:+.3} tangential={:+.3} at center",
        uv.u1.get(mid.0, mid.1),
        uv.u2.get(mid.0, mid.1),
        dec.axial.get(mid.0, mid.1),
        dec.tangential.get(mid.0, mid.1),
    );
    Ok(())
}
