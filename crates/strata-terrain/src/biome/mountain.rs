use strata_voxel::BlockId;

use super::config::{MountainParams, OverhangParams};
use super::generator::{BuildContext, NodeInput};
use crate::curve::CurveRange;
use crate::height_map::HeightMap;
use crate::octaves::{OctaveSampler, OctaveSampler3d};
use crate::seed::{noise_seed, stage_rng};

/// Stone mountains whose height follows the blend value over the range the
/// owning node covers.
#[derive(Debug)]
pub struct MountainGenerator {
    base_height: f64,
    band: CurveRange,
    input: HeightMap,
    range: (f64, f64),
    sampler: OctaveSampler,
    snow_line: Option<i32>,
    overhang: Option<Overhang>,
}

#[derive(Debug)]
struct Overhang {
    field: OctaveSampler3d,
    threshold: f64,
    falloff_below: f64,
    falloff_above: f64,
}

impl Overhang {
    fn new(params: &OverhangParams, ctx: &BuildContext<'_>, label: &str) -> Self {
        let label = format!("{label}/overhang");
        let field = OctaveSampler3d::new(
            &mut stage_rng(ctx.seed, &label),
            &params.octaves,
            ctx.origin(),
            noise_seed(ctx.seed, &label),
        );
        Self {
            field,
            threshold: params.threshold,
            falloff_below: params.falloff_below,
            falloff_above: params.falloff_above,
        }
    }

    fn is_solid(&self, x: usize, y: i32, z: usize, height: i32) -> bool {
        let dy = (height - y) as f64;
        let rate = if dy >= 0.0 {
            self.falloff_below
        } else {
            self.falloff_above
        };
        let bias = dy * rate;
        let amplitude = self.field.max_amplitude();
        if bias - amplitude > self.threshold {
            return true;
        }
        if bias + amplitude <= self.threshold {
            return false;
        }
        self.field.sample(x as i32, y, z as i32) + bias > self.threshold
    }
}

impl MountainGenerator {
    pub(crate) fn new(
        params: &MountainParams,
        ctx: &BuildContext<'_>,
        path: &str,
        input: &NodeInput<'_>,
    ) -> Self {
        let label = format!("biome/{path}");
        let sampler = OctaveSampler::new(
            &mut stage_rng(ctx.seed, &label),
            &params.octaves,
            ctx.origin(),
            noise_seed(ctx.seed, &label),
        );
        Self {
            base_height: params.base_height,
            band: params.height_band,
            input: input.map.clone(),
            range: input.band,
            sampler,
            snow_line: params.snow_line,
            overhang: params
                .overhang
                .as_ref()
                .map(|o| Overhang::new(o, ctx, &label)),
        }
    }

    pub fn has_overhangs(&self) -> bool {
        self.overhang.is_some()
    }

    pub fn height(&self, x: usize, z: usize) -> i32 {
        let (lo, hi) = self.range;
        let value = self.input.get(x, z);
        let t = if hi > lo { (value - lo) / (hi - lo) } else { 1.0 };
        (self.band.eval(t) + self.base_height + self.sampler.sample(x as i32, z as i32)) as i32
    }

    pub fn block(&self, x: usize, y: i32, z: usize, height: i32) -> BlockId {
        let solid = match &self.overhang {
            Some(overhang) => overhang.is_solid(x, y, z, height),
            None => y <= height,
        };
        if !solid {
            BlockId::Air
        } else if y >= height && self.snow_line.is_some_and(|line| y >= line) {
            BlockId::Snow
        } else {
            BlockId::Stone
        }
    }
}
