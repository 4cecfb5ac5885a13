use crate::cell::MapCell;
use crate::error::MapGenError;
use crate::grid::Grid;
use crate::hash_noise::hash_at;

fn check_input<T>(
    input: &Grid<T>,
    layer: &'static str,
    expected_pad: usize,
) -> Result<(), MapGenError> {
    if input.pad() != expected_pad {
        return Err(MapGenError::PadMismatch {
            layer,
            expected: expected_pad,
            actual: input.pad(),
        });
    }
    if input.scale() < 2 {
        return Err(MapGenError::ScaleUnderflow {
            layer,
            scale: input.scale(),
        });
    }
    Ok(())
}

/// Doubles the resolution of a pad-2 grid.
///
/// Output cell `(2i, 2j)` is an exact copy of input `(i + 1, j + 1)`; the
/// cells between copies are 2-way mixes of their axis neighbours and the
/// centre of each square is a 4-way mix of its corners. Each mix draws from
/// the hash at the synthesized cell's world point. Information only moves
/// between adjacent input cells, so shapes soften at their edges but never
/// jump.
pub fn zoom<T: MapCell>(input: &Grid<T>) -> Result<Grid<T>, MapGenError> {
    check_input(input, "zoom", 2)?;

    let n = input.size();
    let mut out = Grid::with_pad(input.basepos(), input.scale() / 2, 2 * n, 2);
    let geo = out.geometry();
    let draw = |i: usize, j: usize| hash_at(geo.map_to_world_point(i, j));

    for i in 0..n + 2 {
        for j in 0..n + 2 {
            let center = &input[(i + 1, j + 1)];
            let right = &input[(i + 1, j + 2)];
            let below = &input[(i + 2, j + 1)];
            let diag = &input[(i + 2, j + 2)];

            out[(2 * i, 2 * j)] = center.clone();
            out[(2 * i, 2 * j + 1)] = T::mix2(center, right, draw(2 * i, 2 * j + 1));
            out[(2 * i + 1, 2 * j)] = T::mix2(center, below, draw(2 * i + 1, 2 * j));
            out[(2 * i + 1, 2 * j + 1)] =
                T::mix4(center, below, right, diag, draw(2 * i + 1, 2 * j + 1));
        }
    }

    Ok(out)
}

/// Doubles the resolution of a pad-1 grid, mixing in both directions.
///
/// Odd/odd output cells copy their input cell exactly; every other cell is
/// mixed from the input cells around it, including across the border where
/// only one neighbour exists. Used for landscape parameters, which are meant
/// to vary smoothly rather than in patches.
pub fn noisy_zoom<T: MapCell>(input: &Grid<T>) -> Result<Grid<T>, MapGenError> {
    check_input(input, "noisy_zoom", 1)?;

    let n = input.size();
    let mut out = Grid::with_pad(input.basepos(), input.scale() / 2, 2 * n, 1);
    let geo = out.geometry();
    let draw = |i: usize, j: usize| hash_at(geo.map_to_world_point(i, j));

    let ie = input.stride() - 1;
    let oe = out.stride() - 1;

    // First and last output rows.
    for j in 1..ie {
        out[(0, 2 * j - 1)] = T::mix2(&input[(0, j)], &input[(1, j)], draw(0, 2 * j - 1));
        out[(0, 2 * j)] = T::mix4(
            &input[(0, j)],
            &input[(1, j)],
            &input[(0, j + 1)],
            &input[(1, j + 1)],
            draw(0, 2 * j),
        );
        out[(oe, 2 * j - 1)] = input[(ie, j)].clone();
        out[(oe, 2 * j)] = T::mix2(&input[(ie, j)], &input[(ie, j + 1)], draw(oe, 2 * j));
    }

    // First and last output columns.
    for i in 1..ie {
        out[(2 * i - 1, 0)] = T::mix2(&input[(i, 0)], &input[(i, 1)], draw(2 * i - 1, 0));
        out[(2 * i, 0)] = T::mix4(
            &input[(i, 0)],
            &input[(i, 1)],
            &input[(i + 1, 0)],
            &input[(i + 1, 1)],
            draw(2 * i, 0),
        );
        out[(2 * i - 1, oe)] = input[(i, ie)].clone();
        out[(2 * i, oe)] = T::mix2(&input[(i, ie)], &input[(i + 1, ie)], draw(2 * i, oe));
    }

    // Corners.
    out[(0, 0)] = T::mix4(
        &input[(0, 0)],
        &input[(0, 1)],
        &input[(1, 0)],
        &input[(1, 1)],
        draw(0, 0),
    );
    out[(0, oe)] = T::mix2(&input[(0, ie)], &input[(1, ie)], draw(0, oe));
    out[(oe, 0)] = T::mix2(&input[(ie, 0)], &input[(ie, 1)], draw(oe, 0));
    out[(oe, oe)] = input[(ie, ie)].clone();

    for i in 1..ie {
        for j in 1..ie {
            let center = &input[(i, j)];
            let right = &input[(i, j + 1)];
            let below = &input[(i + 1, j)];
            let diag = &input[(i + 1, j + 1)];

            out[(2 * i - 1, 2 * j - 1)] = center.clone();
            out[(2 * i - 1, 2 * j)] = T::mix2(center, right, draw(2 * i - 1, 2 * j));
            out[(2 * i, 2 * j - 1)] = T::mix2(center, below, draw(2 * i, 2 * j - 1));
            out[(2 * i, 2 * j)] = T::mix4(center, below, right, diag, draw(2 * i, 2 * j));
        }
    }

    Ok(out)
}
