//! Static per-operator configuration.
//!
//! The table answers questions a host asks before running an operator: which
//! amounts it reads, their defaults and ranges, whether it looks at faces or
//! vertices, and (for topology rewrites on closed meshes) how many elements it
//! will produce.

use super::params::OpParams;
use super::Operator;

/// Linear prediction of output counts from input counts.
///
/// Row `i` holds the coefficients of `(v, e, f)` for output count `i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VefMatrix(pub [[usize; 3]; 3]);

impl VefMatrix {
    /// The identity prediction.
    pub const IDENTITY: VefMatrix = VefMatrix([[1, 0, 0], [0, 1, 0], [0, 0, 1]]);

    /// Predict `[v, e, f]` after the operator.
    pub fn apply(&self, vef: [usize; 3]) -> [usize; 3] {
        let m = &self.0;
        [0, 1, 2].map(|i| m[i][0] * vef[0] + m[i][1] * vef[1] + m[i][2] * vef[2])
    }

    /// The prediction for running `self` and then `next`.
    pub fn then(&self, next: &VefMatrix) -> VefMatrix {
        let (a, b) = (&next.0, &self.0);
        let mut out = [[0; 3]; 3];
        for (i, row) in out.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..3).map(|k| a[i][k] * b[k][j]).sum();
            }
        }
        VefMatrix(out)
    }
}

/// Description of one operator's parameters and behaviour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpConfig {
    /// Reads `value_a`.
    pub uses_a: bool,
    /// Reads `value_b`.
    pub uses_b: bool,
    /// Default for `value_a`.
    pub a_default: f64,
    /// Default for `value_b`.
    pub b_default: f64,
    /// Lowest meaningful `value_a`.
    pub a_min: f64,
    /// Highest meaningful `value_a`.
    pub a_max: f64,
    /// Lowest `value_a` that keeps the output well formed.
    pub a_safe_min: f64,
    /// Highest `value_a` that keeps the output well formed.
    pub a_safe_max: f64,
    /// Lowest meaningful `value_b`.
    pub b_min: f64,
    /// Highest meaningful `value_b`.
    pub b_max: f64,
    /// Lowest `value_b` that keeps the output well formed.
    pub b_safe_min: f64,
    /// Highest `value_b` that keeps the output well formed.
    pub b_safe_max: f64,
    /// Applies its filter to faces.
    pub uses_faces: bool,
    /// Applies its filter to vertices.
    pub uses_vertices: bool,
    /// Honours `randomize`.
    pub uses_randomize: bool,
    /// Output counts on a closed mesh with everything selected.
    pub vef: Option<VefMatrix>,
}

impl OpConfig {
    const NONE: OpConfig = OpConfig {
        uses_a: false,
        uses_b: false,
        a_default: 0.0,
        b_default: 0.0,
        a_min: -1.0,
        a_max: 1.0,
        a_safe_min: -1.0,
        a_safe_max: 1.0,
        b_min: -1.0,
        b_max: 1.0,
        b_safe_min: -1.0,
        b_safe_max: 1.0,
        uses_faces: false,
        uses_vertices: false,
        uses_randomize: false,
        vef: None,
    };

    /// A face operator reading `value_a`.
    const fn face_a(a_default: f64, a_min: f64, a_max: f64, vef: Option<VefMatrix>) -> OpConfig {
        OpConfig {
            uses_a: true,
            a_default,
            a_min,
            a_max,
            a_safe_min: a_min,
            a_safe_max: a_max,
            uses_faces: true,
            uses_randomize: true,
            vef,
            ..OpConfig::NONE
        }
    }

    /// A face operator reading both amounts.
    const fn face_ab(
        a_default: f64,
        b_default: f64,
        a_range: (f64, f64),
        b_range: (f64, f64),
        vef: Option<VefMatrix>,
    ) -> OpConfig {
        OpConfig {
            uses_a: true,
            uses_b: true,
            a_default,
            b_default,
            a_min: a_range.0,
            a_max: a_range.1,
            a_safe_min: a_range.0,
            a_safe_max: a_range.1,
            b_min: b_range.0,
            b_max: b_range.1,
            b_safe_min: b_range.0,
            b_safe_max: b_range.1,
            uses_faces: true,
            uses_randomize: true,
            vef,
            ..OpConfig::NONE
        }
    }

    /// Narrow the safe range of `value_a`.
    const fn safe_a(mut self, min: f64, max: f64) -> OpConfig {
        self.a_safe_min = min;
        self.a_safe_max = max;
        self
    }

    /// Rewrite the whole mesh, ignoring the filter.
    const fn whole(mut self) -> OpConfig {
        self.uses_faces = false;
        self
    }

    /// Switch the filter from faces to vertices.
    const fn on_vertices(mut self) -> OpConfig {
        self.uses_faces = false;
        self.uses_vertices = true;
        self
    }
}

const fn m(rows: [[usize; 3]; 3]) -> Option<VefMatrix> {
    Some(VefMatrix(rows))
}

const DOUBLE: [[usize; 3]; 3] = [[2, 0, 0], [0, 2, 0], [0, 0, 2]];
const DETACHED: [[usize; 3]; 3] = [[0, 2, 0], [0, 2, 0], [0, 0, 1]];

impl Operator {
    /// This operator's row in the configuration table.
    pub fn config(self) -> OpConfig {
        use Operator::*;
        let full = (f64::NEG_INFINITY, f64::INFINITY);
        match self {
            Identity => OpConfig {
                vef: Some(VefMatrix::IDENTITY),
                ..OpConfig::NONE
            },
            Kis => OpConfig::face_a(0.1, -10.0, 10.0, m([[1, 0, 1], [0, 3, 0], [0, 2, 0]]))
                .safe_a(-1.0, 1.0),
            Dual => OpConfig {
                vef: m([[0, 0, 1], [0, 1, 0], [1, 0, 0]]),
                ..OpConfig::NONE
            },
            Ambo => OpConfig {
                vef: m([[0, 1, 0], [0, 2, 0], [1, 0, 1]]),
                ..OpConfig::NONE
            },
            Zip => OpConfig::face_a(0.5, -1.0, 2.0, m([[0, 2, 0], [0, 3, 0], [1, 0, 1]]))
                .safe_a(0.0, 1.0)
                .whole(),
            Truncate => OpConfig::face_a(0.3, 0.0, 0.5, m([[0, 2, 0], [0, 3, 0], [1, 0, 1]]))
                .safe_a(0.01, 0.49)
                .on_vertices(),
            Join => OpConfig::face_a(0.0, -1.0, 1.0, m([[1, 0, 1], [0, 2, 0], [0, 1, 0]]))
                .whole(),
            Needle => OpConfig::face_a(0.0, -1.0, 1.0, m([[1, 0, 1], [0, 3, 0], [0, 2, 0]]))
                .whole(),
            Expand => OpConfig::face_a(0.5, 0.0, 1.0, m([[0, 2, 0], [0, 4, 0], [1, 1, 1]]))
                .safe_a(0.01, 0.99)
                .whole(),
            Ortho => OpConfig::face_a(0.0, -1.0, 1.0, m([[1, 1, 1], [0, 4, 0], [0, 2, 0]])),
            Bevel => OpConfig::face_ab(
                0.25,
                0.1,
                (0.0, 0.5),
                (0.0, 1.0),
                m([[0, 4, 0], [0, 6, 0], [1, 1, 1]]),
            ),
            Meta => OpConfig::face_a(0.0, -1.0, 1.0, m([[1, 1, 1], [0, 6, 0], [0, 4, 0]])),
            Gyro => OpConfig::face_ab(
                1.0 / 3.0,
                0.0,
                (0.0, 1.0),
                (-1.0, 1.0),
                m([[1, 2, 1], [0, 5, 0], [0, 2, 0]]),
            )
            .whole(),
            Snub => OpConfig::face_ab(
                1.0 / 3.0,
                0.5,
                (0.0, 1.0),
                (0.0, 1.0),
                m([[0, 2, 0], [0, 5, 0], [1, 2, 1]]),
            )
            .whole(),
            Subdivide => OpConfig {
                uses_faces: true,
                vef: m([[1, 1, 0], [0, 4, 0], [0, 2, 1]]),
                ..OpConfig::NONE
            },
            Chamfer => OpConfig::face_a(0.5, 0.0, 1.0, m([[1, 2, 0], [0, 4, 0], [0, 1, 1]]))
                .safe_a(0.01, 0.99)
                .whole(),
            Loft => OpConfig::face_ab(
                0.5,
                0.2,
                (0.0, 1.0),
                (-2.0, 2.0),
                m([[1, 2, 0], [0, 5, 0], [0, 2, 1]]),
            ),
            Extrude => OpConfig::face_a(0.1, -10.0, 10.0, m([[1, 2, 0], [0, 5, 0], [0, 2, 1]])),
            Lace | OppositeLace => OpConfig::face_ab(
                0.5,
                0.2,
                (0.0, 1.0),
                (-2.0, 2.0),
                m([[1, 2, 0], [0, 7, 0], [0, 4, 1]]),
            ),
            Stake => OpConfig::face_ab(
                0.5,
                0.2,
                (0.0, 1.0),
                (-2.0, 2.0),
                m([[1, 2, 1], [0, 7, 0], [0, 4, 0]]),
            ),
            Quinto => OpConfig::face_a(0.5, 0.0, 1.0, m([[1, 3, 0], [0, 6, 0], [0, 2, 1]])),
            Propeller => {
                OpConfig::face_a(1.0 / 3.0, 0.0, 0.5, m([[1, 2, 0], [0, 5, 0], [0, 2, 1]])).whole()
            }
            Whirl => OpConfig::face_ab(
                1.0 / 3.0,
                0.2,
                (0.0, 0.5),
                (0.0, 1.0),
                m([[1, 4, 0], [0, 7, 0], [0, 2, 1]]),
            )
            .whole(),
            Volute => OpConfig::face_ab(
                1.0 / 3.0,
                0.2,
                (0.0, 0.5),
                (0.0, 1.0),
                m([[0, 2, 1], [0, 7, 0], [1, 4, 0]]),
            )
            .whole(),
            Exalt => OpConfig::face_a(0.0, -1.0, 1.0, m([[1, 2, 1], [0, 9, 0], [0, 6, 0]]))
                .whole(),
            Yank => OpConfig::face_a(0.5, -1.0, 2.0, m([[0, 6, 0], [0, 9, 0], [1, 2, 1]]))
                .safe_a(0.0, 1.0)
                .whole(),
            SplitFaces => OpConfig {
                uses_faces: true,
                ..OpConfig::NONE
            },

            VertexScale => OpConfig::face_a(0.5, -2.0, 2.0, Some(VefMatrix::IDENTITY)).on_vertices(),
            VertexRotate => OpConfig::face_a(45.0, -180.0, 180.0, Some(VefMatrix::IDENTITY)).on_vertices(),
            VertexFlex => OpConfig::face_a(0.1, -1.0, 1.0, Some(VefMatrix::IDENTITY)).on_vertices(),
            FaceScale => OpConfig::face_a(0.5, -2.0, 2.0, m(DETACHED)),
            FaceRotate => OpConfig::face_a(45.0, -180.0, 180.0, m(DETACHED)),
            FaceSlide => OpConfig::face_ab(0.1, 0.0, (-1.0, 1.0), (-1.0, 1.0), m(DETACHED)),
            FaceOffset => OpConfig::face_a(0.1, -1.0, 1.0, m(DETACHED)),
            Shell => OpConfig::face_a(0.1, -1.0, 1.0, m(DOUBLE))
                .whole(),

            Spherize | Cylinderize => OpConfig {
                uses_a: true,
                a_default: 1.0,
                a_min: 0.0,
                a_max: 1.0,
                a_safe_min: 0.0,
                a_safe_max: 1.0,
                vef: Some(VefMatrix::IDENTITY),
                ..OpConfig::NONE
            },
            Stretch => OpConfig {
                uses_a: true,
                a_default: 1.5,
                a_min: -4.0,
                a_max: 4.0,
                a_safe_min: 0.01,
                a_safe_max: 4.0,
                vef: Some(VefMatrix::IDENTITY),
                ..OpConfig::NONE
            },
            Recenter => OpConfig {
                vef: Some(VefMatrix::IDENTITY),
                ..OpConfig::NONE
            },
            SitLevel => OpConfig {
                uses_a: true,
                a_min: 0.0,
                a_max: full.1,
                a_safe_min: 0.0,
                a_safe_max: full.1,
                vef: Some(VefMatrix::IDENTITY),
                ..OpConfig::NONE
            },
            Canonicalize => OpConfig {
                uses_a: true,
                a_default: 100.0,
                a_min: 0.0,
                a_max: 1000.0,
                a_safe_min: 0.0,
                a_safe_max: 1000.0,
                vef: Some(VefMatrix::IDENTITY),
                ..OpConfig::NONE
            },

            FaceRemove | FaceKeep | FaceMerge => OpConfig {
                uses_faces: true,
                uses_randomize: true,
                ..OpConfig::NONE
            },
            VertexRemove | VertexKeep => OpConfig {
                uses_vertices: true,
                uses_randomize: true,
                ..OpConfig::NONE
            },

            AddDual => OpConfig {
                uses_a: true,
                a_default: 1.0,
                a_min: 0.0,
                a_max: 2.0,
                a_safe_min: 0.0,
                a_safe_max: 2.0,
                vef: m([[1, 0, 1], [0, 2, 0], [1, 0, 1]]),
                ..OpConfig::NONE
            },
            AddCopyX | AddCopyY | AddCopyZ | AddMirrorX | AddMirrorY | AddMirrorZ => OpConfig {
                uses_a: true,
                a_default: if matches!(self, AddCopyX | AddCopyY | AddCopyZ) {
                    1.0
                } else {
                    0.0
                },
                a_min: -4.0,
                a_max: 4.0,
                a_safe_min: -4.0,
                a_safe_max: 4.0,
                vef: m(DOUBLE),
                ..OpConfig::NONE
            },
            Stack => OpConfig::face_ab(0.5, 0.8, (-2.0, 2.0), (0.0, 1.0), None).safe_a(0.01, 2.0),

            Weld => OpConfig {
                uses_a: true,
                a_default: 0.001,
                a_min: 0.0,
                a_max: 1.0,
                a_safe_min: crate::MIN_WELD_DISTANCE,
                a_safe_max: 0.1,
                ..OpConfig::NONE
            },
            FillHoles => OpConfig::NONE,
            Slice => OpConfig {
                uses_a: true,
                a_min: full.0,
                a_max: full.1,
                a_safe_min: full.0,
                a_safe_max: full.1,
                ..OpConfig::NONE
            },
        }
    }

    /// Parameters holding this operator's defaults, selecting everything.
    pub fn default_params(self) -> OpParams {
        let config = self.config();
        OpParams::new()
            .with_a(config.a_default)
            .with_b(config.b_default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vef_apply() {
        // Cube kis
        let kis = Operator::Kis.config().vef.unwrap();
        assert_eq!(kis.apply([8, 12, 6]), [14, 36, 24]);
        // Cube dual is the octahedron
        let dual = Operator::Dual.config().vef.unwrap();
        assert_eq!(dual.apply([8, 12, 6]), [6, 12, 8]);
    }

    #[test]
    fn test_composed_matrices() {
        let dual = Operator::Dual.config().vef.unwrap();
        let whirl = Operator::Whirl.config().vef.unwrap();
        assert_eq!(whirl.then(&dual), Operator::Volute.config().vef.unwrap());
        assert_eq!(dual.then(&dual), VefMatrix::IDENTITY);

        let needle = Operator::Needle.config().vef.unwrap();
        assert_eq!(needle.then(&needle), Operator::Exalt.config().vef.unwrap());
        let zip = Operator::Zip.config().vef.unwrap();
        assert_eq!(zip.then(&zip), Operator::Yank.config().vef.unwrap());
    }

    #[test]
    fn test_euler_characteristic_preserved() {
        // Every topology rewrite keeps v - e + f on a closed mesh
        let counts = [8usize, 12, 6];
        for op in Operator::ALL {
            let Some(vef) = op.config().vef else { continue };
            let [v, e, f] = vef.apply(counts);
            let chi = v as i64 - e as i64 + f as i64;
            let scale = match chi {
                2 => 1,
                4 => 2,
                _ => 0,
            };
            assert!(scale > 0 || vef.0 == DETACHED, "{:?} breaks euler: {}", op, chi);
        }
    }

    #[test]
    fn test_default_params() {
        let params = Operator::Truncate.default_params();
        assert_eq!(params.value_a, 0.3);
        let config = Operator::Truncate.config();
        assert!(config.uses_vertices && !config.uses_faces);
    }
}
