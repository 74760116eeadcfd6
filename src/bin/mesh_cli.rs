#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(err) = native::run() {
        eprintln!("mesh_cli error: {err}");
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::fmt::Write as _;
    use std::fs::{self, File};
    use std::hint::black_box;
    use std::io::{BufWriter, Write};
    use std::path::{Path, PathBuf};
    use std::time::Instant;
    use stl_viewer_engine::geom::{
        BBox, GeometryAttribute, MeshBuffers, NORMAL, POSITION, SplitContext,
        SplitDiagnostics, Transform, Vec3, all_point_triangles, box_geometry, cylinder_ring_points,
        not_atan2, not_atan2_f32, split_disjoint_geometry_with_context,
    };

    const SNAPSHOT_QUANTIZE: f64 = 1e-6;
    const SNAPSHOT_DECIMALS: usize = 6;

    const BENCH_DEFAULT_COUNT: usize = 5_000_000;
    const BENCH_DEFAULT_TRIES: usize = 3;
    const BENCH_SEED: u64 = 0xa7a2;

    const USAGE: &str = r#"mesh_cli (stl-viewer-engine)

USAGE:
  mesh_cli list
  mesh_cli run <scenario|all> [options]
  mesh_cli bench [--count <n>] [--tries <n>]

SCENARIOS:
  single_cube
  separate_cubes
  contacting_cubes
  angles
  cylinder_stress

OPTIONS (run):
  --out-dir <dir>    Write <scenario>.obj and/or <scenario>.snap to this dir (required for `all`)
  --obj <path>       Write OBJ with one object per part (single scenario only)
  --snap <path>      Write snapshot (single scenario only)
  --no-obj           Skip OBJ when using --out-dir
  --no-snap          Skip snapshot when using --out-dir
  --overwrite        Overwrite existing output files
  -h, --help         Show this help

OPTIONS (bench):
  --count <n>        Input pairs per try (default 5000000)
  --tries <n>        Number of tries (default 3)
"#;

    pub fn run() -> Result<(), String> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let mut args = Args::new(args);

        let Some(command) = args.next() else {
            print_usage();
            return Ok(());
        };

        match command.as_str() {
            "list" => {
                print_scenarios();
                Ok(())
            }
            "run" => cmd_run(&mut args),
            "bench" => cmd_bench(&mut args),
            "-h" | "--help" | "help" => {
                print_usage();
                Ok(())
            }
            other => Err(format!("unknown command `{other}`\n\n{USAGE}")),
        }
    }

    fn print_usage() {
        println!("{USAGE}");
    }

    fn print_scenarios() {
        for scenario in Scenario::ALL {
            println!("{}", scenario.name());
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // run
    // ─────────────────────────────────────────────────────────────────────

    fn cmd_run(args: &mut Args) -> Result<(), String> {
        let scenario_name = args.next().ok_or("missing scenario name")?;

        let mut out_dir: Option<PathBuf> = None;
        let mut obj_path: Option<PathBuf> = None;
        let mut snap_path: Option<PathBuf> = None;
        let mut overwrite = false;
        let mut write_obj = true;
        let mut write_snap = true;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--out-dir" => out_dir = Some(PathBuf::from(args.value("--out-dir")?)),
                "--obj" => obj_path = Some(PathBuf::from(args.value("--obj")?)),
                "--snap" => snap_path = Some(PathBuf::from(args.value("--snap")?)),
                "--overwrite" => overwrite = true,
                "--no-obj" => write_obj = false,
                "--no-snap" => write_snap = false,
                "-h" | "--help" => {
                    print_usage();
                    return Ok(());
                }
                other => return Err(format!("unknown option `{other}`\n\n{USAGE}")),
            }
        }

        if let Some(dir) = out_dir.as_ref() {
            if obj_path.is_some() || snap_path.is_some() {
                return Err("use either --out-dir or --obj/--snap (not both)".to_string());
            }
            if !write_obj && !write_snap {
                return Err("nothing to write (both --no-obj and --no-snap set)".to_string());
            }

            fs::create_dir_all(dir).map_err(|e| format!("create out dir: {e}"))?;

            if scenario_name == "all" {
                for scenario in Scenario::ALL {
                    run_one_scenario_to_dir(*scenario, dir, write_obj, write_snap, overwrite)?;
                }
                return Ok(());
            }

            let scenario = Scenario::from_str(scenario_name.as_str())
                .ok_or_else(|| unknown_scenario(&scenario_name))?;
            return run_one_scenario_to_dir(scenario, dir, write_obj, write_snap, overwrite);
        }

        if scenario_name == "all" {
            return Err("`run all` requires --out-dir".to_string());
        }

        let scenario =
            Scenario::from_str(scenario_name.as_str()).ok_or_else(|| unknown_scenario(&scenario_name))?;
        let output = run_scenario(scenario)?;

        if let Some(path) = snap_path.as_deref() {
            write_text_file(path, &output.snapshot, overwrite)?;
            eprintln!("wrote {}", path.display());
        } else {
            print!("{}", output.snapshot);
        }

        if let Some(path) = obj_path.as_deref() {
            write_obj_file(path, &output.parts, output.name, overwrite)?;
            eprintln!("wrote {}", path.display());
        }

        eprintln!("{}: {}", output.name, output.diag.summary());
        Ok(())
    }

    fn run_one_scenario_to_dir(
        scenario: Scenario,
        dir: &Path,
        write_obj: bool,
        write_snap: bool,
        overwrite: bool,
    ) -> Result<(), String> {
        let output = run_scenario(scenario)?;

        if write_snap {
            let path = dir.join(format!("{}.snap", output.name));
            write_text_file(&path, &output.snapshot, overwrite)?;
            eprintln!("wrote {}", path.display());
        }

        if write_obj {
            let path = dir.join(format!("{}.obj", output.name));
            write_obj_file(&path, &output.parts, output.name, overwrite)?;
            eprintln!("wrote {}", path.display());
        }

        eprintln!("{}: {}", output.name, output.diag.summary());
        Ok(())
    }

    fn unknown_scenario(name: &str) -> String {
        let mut msg = format!("unknown scenario `{name}`\n\navailable scenarios:\n");
        for scenario in Scenario::ALL {
            let _ = writeln!(msg, "  {}", scenario.name());
        }
        msg
    }

    fn ensure_writable(path: &Path, overwrite: bool) -> Result<(), String> {
        if path.exists() && !overwrite {
            return Err(format!(
                "refusing to overwrite existing file {} (use --overwrite)",
                path.display()
            ));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| format!("create dir {}: {e}", parent.display()))?;
        }
        Ok(())
    }

    fn write_text_file(path: &Path, text: &str, overwrite: bool) -> Result<(), String> {
        ensure_writable(path, overwrite)?;
        fs::write(path, normalize_snapshot_text(text)).map_err(|e| format!("write {}: {e}", path.display()))
    }

    fn write_obj_file(path: &Path, parts: &[MeshBuffers], name: &str, overwrite: bool) -> Result<(), String> {
        ensure_writable(path, overwrite)?;

        let file = File::create(path).map_err(|e| format!("create {}: {e}", path.display()))?;
        let mut w = BufWriter::new(file);
        let obj_err = |e: std::io::Error| format!("write obj: {e}");

        writeln!(w, "# stl-viewer-engine mesh_cli: {name}").map_err(obj_err)?;

        // OBJ indices are 1-based and global across objects.
        let mut base = 1_usize;
        for (idx, part) in parts.iter().enumerate() {
            let positions = triples(part, POSITION)
                .ok_or_else(|| format!("part {idx} has no position attribute"))?;
            let normals = triples(part, NORMAL);

            writeln!(w, "o part_{idx}").map_err(obj_err)?;
            for p in &positions {
                writeln!(w, "v {} {} {}", p[0], p[1], p[2]).map_err(obj_err)?;
            }
            if let Some(normals) = normals.as_ref() {
                for n in normals {
                    writeln!(w, "vn {} {} {}", n[0], n[1], n[2]).map_err(obj_err)?;
                }
            }

            for tri in 0..positions.len() / 3 {
                let a = base + tri * 3;
                let (b, c) = (a + 1, a + 2);
                let written = if normals.is_some() {
                    writeln!(w, "f {a}//{a} {b}//{b} {c}//{c}")
                } else {
                    writeln!(w, "f {a} {b} {c}")
                };
                written.map_err(obj_err)?;
            }
            base += positions.len();
        }

        w.flush().map_err(|e| format!("flush {}: {e}", path.display()))
    }

    fn triples(mesh: &MeshBuffers, name: &str) -> Option<Vec<Vec3>> {
        match mesh.attribute(name)? {
            GeometryAttribute::Buffer(attr) if attr.item_size == 3 => Some(attr.array.to_triples()),
            _ => None,
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Snapshots
    // ─────────────────────────────────────────────────────────────────────

    fn normalize_snapshot_text(text: &str) -> String {
        let normalized = text.replace("\r\n", "\n");
        if normalized.ends_with('\n') {
            normalized
        } else {
            format!("{normalized}\n")
        }
    }

    fn quantize_f64(value: f64) -> f64 {
        if !value.is_finite() {
            return value;
        }
        let q = (value / SNAPSHOT_QUANTIZE).round() * SNAPSHOT_QUANTIZE;
        // Collapses -0.0 as well.
        if q == 0.0 { 0.0 } else { q }
    }

    fn write_vec3_line(out: &mut String, prefix: &str, v: Vec3) {
        let [x, y, z] = v.map(quantize_f64);
        let _ = writeln!(
            out,
            "{prefix} {x:.SNAPSHOT_DECIMALS$} {y:.SNAPSHOT_DECIMALS$} {z:.SNAPSHOT_DECIMALS$}"
        );
    }

    fn write_attribute_layout(out: &mut String, prefix: &str, mesh: &MeshBuffers) {
        for (name, attr) in mesh.attributes().iter() {
            let type_name = match attr {
                GeometryAttribute::Buffer(buffer) => buffer.array.type_name(),
                GeometryAttribute::Interleaved(_) => "Interleaved",
            };
            let _ = writeln!(
                out,
                "{prefix}.attribute.{name} {type_name} item_size={} normalized={}",
                attr.item_size(),
                attr.normalized()
            );
        }
    }

    fn write_split_diagnostics(out: &mut String, diag: &SplitDiagnostics) {
        let _ = writeln!(out, "split_diag.triangle_count {}", diag.triangle_count);
        let _ = writeln!(out, "split_diag.part_count {}", diag.part_count);
        let _ = writeln!(
            out,
            "split_diag.largest_part_triangle_count {}",
            diag.largest_part_triangle_count
        );
        let _ = writeln!(out, "split_diag.directed_edge_count {}", diag.directed_edge_count);
        let _ = writeln!(out, "split_diag.open_edge_count {}", diag.open_edge_count);
        let _ = writeln!(out, "split_diag.non_manifold_edge_count {}", diag.non_manifold_edge_count);
        let _ = writeln!(
            out,
            "split_diag.degenerate_triangle_count {}",
            diag.degenerate_triangle_count
        );
        let _ = writeln!(out, "split_diag.ambiguous_edge_visits {}", diag.ambiguous_edge_visits);
        let _ = writeln!(out, "split_diag.folded_back_candidates {}", diag.folded_back_candidates);
        let _ = writeln!(out, "split_diag.traversal {:?}", diag.traversal);
        let _ = writeln!(out, "split_diag.warning_count {}", diag.warnings.len());
        for (idx, warning) in diag.warnings.iter().enumerate() {
            let _ = writeln!(out, "split_diag.warning.{idx} {warning}");
        }
    }

    fn snapshot(name: &str, input: &MeshBuffers, parts: &[MeshBuffers], diag: &SplitDiagnostics) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "scenario {name}");
        let _ = writeln!(out, "input.triangle_count {}", input.triangle_count());
        let _ = writeln!(out, "input.indexed {}", input.is_indexed());
        write_attribute_layout(&mut out, "input", input);
        write_split_diagnostics(&mut out, diag);

        let _ = writeln!(out, "part_count {}", parts.len());
        for (idx, part) in parts.iter().enumerate() {
            let prefix = format!("part.{idx}");
            let _ = writeln!(out, "{prefix}.triangle_count {}", part.triangle_count());
            write_attribute_layout(&mut out, &prefix, part);
            let bbox = triples(part, POSITION).and_then(BBox::from_points);
            if let Some(bbox) = bbox {
                write_vec3_line(&mut out, &format!("{prefix}.bbox.min"), bbox.min);
                write_vec3_line(&mut out, &format!("{prefix}.bbox.max"), bbox.max);
            }
        }
        out
    }

    // ─────────────────────────────────────────────────────────────────────
    // Scenarios
    // ─────────────────────────────────────────────────────────────────────

    #[derive(Debug, Clone, Copy)]
    enum Scenario {
        SingleCube,
        SeparateCubes,
        ContactingCubes,
        Angles,
        CylinderStress,
    }

    impl Scenario {
        const ALL: &'static [Scenario] = &[
            Scenario::SingleCube,
            Scenario::SeparateCubes,
            Scenario::ContactingCubes,
            Scenario::Angles,
            Scenario::CylinderStress,
        ];

        fn name(self) -> &'static str {
            match self {
                Scenario::SingleCube => "single_cube",
                Scenario::SeparateCubes => "separate_cubes",
                Scenario::ContactingCubes => "contacting_cubes",
                Scenario::Angles => "angles",
                Scenario::CylinderStress => "cylinder_stress",
            }
        }

        fn from_str(name: &str) -> Option<Self> {
            Self::ALL.iter().copied().find(|scenario| scenario.name() == name)
        }
    }

    struct ScenarioOutput {
        name: &'static str,
        parts: Vec<MeshBuffers>,
        diag: SplitDiagnostics,
        snapshot: String,
    }

    fn run_scenario(scenario: Scenario) -> Result<ScenarioOutput, String> {
        let input = build_input(scenario)?;
        let mut ctx = SplitContext::default();
        let (parts, diag) =
            split_disjoint_geometry_with_context(&input, &mut ctx).map_err(|e| e.to_string())?;
        let name = scenario.name();
        let snapshot = snapshot(name, &input, &parts, &diag);
        Ok(ScenarioOutput {
            name,
            parts,
            diag,
            snapshot,
        })
    }

    fn build_input(scenario: Scenario) -> Result<MeshBuffers, String> {
        let cube = || box_geometry([1.0, 1.0, 1.0], [1, 1, 1]);
        let translated = |offset: Vec3| {
            let mut mesh = cube();
            mesh.translate(offset);
            mesh
        };

        let mesh = match scenario {
            Scenario::SingleCube => box_geometry([1.0, 1.0, 1.0], [3, 2, 1]),
            Scenario::SeparateCubes => {
                MeshBuffers::merge(&[cube(), translated([10.0, 0.0, 0.0])]).map_err(|e| e.to_string())?
            }
            Scenario::ContactingCubes => {
                MeshBuffers::merge(&[cube(), translated([1.0, 0.0, 0.0])]).map_err(|e| e.to_string())?
            }
            Scenario::Angles => {
                let angle0 = tilted(&[
                    [0.0, 0.0, 0.0],
                    [1.0, 0.0, 0.0],
                    [0.0, 0.0, 1.0],
                    [0.0, 0.0, 0.0],
                    [0.0, 0.0, 1.0],
                    [1.0, 0.1, 0.0],
                ]);
                let angle1 = tilted(&[
                    [0.0, 0.0, 0.0],
                    [2.0, 0.1999, 0.0],
                    [0.0, 0.0, 1.0],
                    [0.0, 0.0, 0.0],
                    [0.0, 0.0, 1.0],
                    [2.0, -0.2, 0.0],
                ]);
                MeshBuffers::merge(&[angle0, angle1]).map_err(|e| e.to_string())?
            }
            Scenario::CylinderStress => {
                MeshBuffers::from_points(&all_point_triangles(&cylinder_ring_points(10, 1.0, 1.0)))
            }
        };
        Ok(mesh)
    }

    fn tilted(corners: &[Vec3]) -> MeshBuffers {
        let mut mesh = MeshBuffers::from_points(corners);
        mesh.apply_transform(Transform::rotate_x(0.1));
        mesh.apply_transform(Transform::rotate_y(0.1));
        mesh
    }

    // ─────────────────────────────────────────────────────────────────────
    // bench
    // ─────────────────────────────────────────────────────────────────────

    fn cmd_bench(args: &mut Args) -> Result<(), String> {
        let mut count = BENCH_DEFAULT_COUNT;
        let mut tries = BENCH_DEFAULT_TRIES;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--count" => count = args.number("--count")?,
                "--tries" => tries = args.number("--tries")?,
                "-h" | "--help" => {
                    print_usage();
                    return Ok(());
                }
                other => return Err(format!("unknown option `{other}`\n\n{USAGE}")),
            }
        }

        let mut rng = StdRng::seed_from_u64(BENCH_SEED);
        let xs: Vec<f64> = (0..count).map(|_| rng.random()).collect();
        let ys: Vec<f64> = (0..count).map(|_| rng.random()).collect();
        let xs32: Vec<f32> = (0..count).map(|_| rng.random()).collect();
        let ys32: Vec<f32> = (0..count).map(|_| rng.random()).collect();

        let mut std_atan2 = Vec::with_capacity(tries);
        let mut substitute = Vec::with_capacity(tries);
        let mut substitute_f32 = Vec::with_capacity(tries);
        for _ in 0..tries {
            std_atan2.push(time_ms(|| ys.iter().zip(&xs).map(|(&y, &x)| y.atan2(x)).sum::<f64>()));
            substitute.push(time_ms(|| ys.iter().zip(&xs).map(|(&y, &x)| not_atan2(y, x)).sum::<f64>()));
            substitute_f32.push(time_ms(|| {
                ys32.iter()
                    .zip(&xs32)
                    .map(|(&y, &x)| f64::from(not_atan2_f32(y, x)))
                    .sum::<f64>()
            }));
        }

        println!("pairs per try: {count}");
        println!("f64::atan2: {}", format_times(&std_atan2));
        println!("not_atan2: {}", format_times(&substitute));
        println!("not_atan2_f32: {}", format_times(&substitute_f32));
        Ok(())
    }

    fn time_ms(f: impl FnOnce() -> f64) -> f64 {
        let start = Instant::now();
        black_box(f());
        start.elapsed().as_secs_f64() * 1000.0
    }

    fn format_times(times: &[f64]) -> String {
        let parts: Vec<String> = times.iter().map(|ms| format!("{ms:.0}")).collect();
        format!("{}ms", parts.join(","))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Args
    // ─────────────────────────────────────────────────────────────────────

    struct Args {
        args: Vec<String>,
        pos: usize,
    }

    impl Args {
        fn new(args: Vec<String>) -> Self {
            Self { args, pos: 0 }
        }

        fn next(&mut self) -> Option<String> {
            let arg = self.args.get(self.pos)?.clone();
            self.pos += 1;
            Some(arg)
        }

        fn value(&mut self, flag: &str) -> Result<String, String> {
            self.next()
                .ok_or_else(|| format!("missing value for {flag}"))
        }

        fn number(&mut self, flag: &str) -> Result<usize, String> {
            let raw = self.value(flag)?;
            raw.parse()
                .map_err(|e| format!("invalid value `{raw}` for {flag}: {e}"))
        }
    }
}
