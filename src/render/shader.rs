//! WGSL loading: `#include` expansion, grid preamble, host-side validation

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::core::error::Error;
use crate::core::types::Result;
use crate::lighting::grid::GridConfig;

const INCLUDE_DIRECTIVE: &str = "#include";

/// Resolves shader programs by logical name inside one directory
pub struct ShaderLibrary {
    root: PathBuf,
    preamble: String,
}

impl ShaderLibrary {
    /// Library rooted at `root`, with `grid`'s constants prepended to every program
    pub fn new(root: impl Into<PathBuf>, grid: &GridConfig) -> Self {
        Self {
            root: root.into(),
            preamble: grid.wgsl_preamble(),
        }
    }

    /// The shaders shipped next to this crate
    pub fn bundled(grid: &GridConfig) -> Self {
        Self::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("shaders"), grid)
    }

    pub fn preamble(&self) -> &str {
        &self.preamble
    }

    /// File backing a logical shader name
    pub fn path_for(&self, name: &str) -> PathBuf {
        let file = name.strip_suffix(".wgsl").unwrap_or(name);
        self.root.join(format!("{file}.wgsl"))
    }

    /// Full program text: preamble followed by the expanded source
    pub fn load_source(&self, name: &str) -> Result<String> {
        let mut out = self.preamble.clone();
        let mut included = HashSet::new();
        let mut stack = Vec::new();
        self.expand(name, &mut included, &mut stack, &mut out)?;
        Ok(out)
    }

    fn expand(
        &self,
        name: &str,
        included: &mut HashSet<String>,
        stack: &mut Vec<String>,
        out: &mut String,
    ) -> Result<()> {
        let key = name.strip_suffix(".wgsl").unwrap_or(name).to_string();
        if stack.contains(&key) {
            stack.push(key);
            return Err(Error::ShaderCompile {
                name: stack[0].clone(),
                diagnostic: format!("include cycle: {}", stack.join(" -> ")),
            });
        }
        if !included.insert(key.clone()) {
            return Ok(());
        }

        let path = self.path_for(&key);
        let source = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::ShaderNotFound {
                name: key.clone(),
                path: path.clone(),
            },
            _ => Error::Io(e),
        })?;
        log::debug!("Loading shader {}", path.display());

        stack.push(key.clone());
        for (line_number, line) in source.lines().enumerate() {
            match line.trim_start().strip_prefix(INCLUDE_DIRECTIVE) {
                Some(rest) => {
                    let target = parse_include(rest).ok_or_else(|| Error::ShaderCompile {
                        name: key.clone(),
                        diagnostic: format!(
                            "{}:{}: malformed include directive",
                            path.display(),
                            line_number + 1
                        ),
                    })?;
                    self.expand(target, included, stack, out)?;
                }
                None => {
                    out.push_str(line);
                    out.push('\n');
                }
            }
        }
        stack.pop();
        Ok(())
    }

    /// Load, expand, parse and validate a program
    pub fn compile(&self, name: &str) -> Result<ShaderProgram> {
        let source = self.load_source(name)?;
        let module = naga::front::wgsl::parse_str(&source).map_err(|e| Error::ShaderCompile {
            name: name.to_string(),
            diagnostic: e.emit_to_string(&source),
        })?;
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::default(),
        )
        .validate(&module)
        .map_err(|e| Error::ShaderCompile {
            name: name.to_string(),
            diagnostic: e.emit_to_string(&source),
        })?;

        log::info!(
            "Compiled shader '{}' ({} entry points)",
            name,
            module.entry_points.len()
        );
        Ok(ShaderProgram {
            name: name.to_string(),
            source,
            module,
        })
    }
}

/// `"name"` after the directive
fn parse_include(rest: &str) -> Option<&str> {
    let rest = rest.trim();
    let inner = rest.strip_prefix('"')?.strip_suffix('"')?;
    (!inner.is_empty() && !inner.contains('"')).then_some(inner)
}

/// A validated WGSL program
pub struct ShaderProgram {
    name: String,
    source: String,
    module: naga::Module,
}

impl ShaderProgram {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Expanded source, preamble included
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Entry point `entry` of the given stage, or a link error
    pub fn entry_point(&self, entry: &str, stage: naga::ShaderStage) -> Result<&naga::EntryPoint> {
        let found = self
            .module
            .entry_points
            .iter()
            .find(|ep| ep.name == entry)
            .ok_or_else(|| Error::ShaderLink {
                name: self.name.clone(),
                reason: format!("missing entry point '{entry}'"),
            })?;
        if found.stage != stage {
            return Err(Error::ShaderLink {
                name: self.name.clone(),
                reason: format!("'{entry}' is a {:?} entry point, expected {:?}", found.stage, stage),
            });
        }
        Ok(found)
    }

    /// Check that compute entry `entry` runs `expected` invocations per axis
    pub fn expect_workgroup_size(&self, entry: &str, expected: [u32; 3]) -> Result<()> {
        let ep = self.entry_point(entry, naga::ShaderStage::Compute)?;
        if ep.workgroup_size != expected {
            return Err(Error::ShaderLink {
                name: self.name.clone(),
                reason: format!(
                    "'{entry}' has workgroup size {:?}, host dispatches {:?}",
                    ep.workgroup_size, expected
                ),
            });
        }
        Ok(())
    }

    /// Check that WGSL struct `name` has the host's size and member offsets.
    ///
    /// `members` lists every non-padding host field in declaration order.
    pub fn expect_struct_layout(&self, name: &str, span: usize, members: &[(&str, usize)]) -> Result<()> {
        let ty = self
            .module
            .types
            .iter()
            .map(|(_, ty)| ty)
            .find(|ty| ty.name.as_deref() == Some(name))
            .ok_or_else(|| Error::Layout(format!("{}: no struct '{name}'", self.name)))?;
        let naga::TypeInner::Struct {
            members: shader_members,
            span: shader_span,
        } = &ty.inner
        else {
            return Err(Error::Layout(format!("{}: '{name}' is not a struct", self.name)));
        };

        let shader: Vec<(&str, usize)> = shader_members
            .iter()
            .map(|m| (m.name.as_deref().unwrap_or("_"), m.offset as usize))
            .collect();
        if *shader_span as usize != span || shader != members {
            return Err(Error::Layout(format!(
                "{}: '{name}' is {} bytes {:?}, host expects {} bytes {:?}",
                self.name, shader_span, shader, span, members
            )));
        }
        Ok(())
    }

    /// Hand the validated source to wgpu
    pub fn create_module(&self, device: &wgpu::Device) -> wgpu::ShaderModule {
        device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(self.name.as_str()),
            source: wgpu::ShaderSource::Wgsl(self.source.as_str().into()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lighting::state::LightParams;
    use crate::render::buffer::CameraUniform;
    use crate::voxel::Voxel;
    use std::fs;

    fn library(files: &[(&str, &str)]) -> (tempfile::TempDir, ShaderLibrary) {
        let dir = tempfile::tempdir().unwrap();
        for (name, source) in files {
            fs::write(dir.path().join(format!("{name}.wgsl")), source).unwrap();
        }
        let lib = ShaderLibrary::new(dir.path(), &GridConfig::default());
        (dir, lib)
    }

    #[test]
    fn test_nested_includes_expand_once() {
        let (_dir, lib) = library(&[
            ("main", "#include \"a\"\n#include \"b\"\nfn main_fn() {}\n"),
            ("a", "#include \"base\"\nfn a() {}\n"),
            ("b", "#include \"base.wgsl\"\nfn b() {}\n"),
            ("base", "const BASE: u32 = 1u;\n"),
        ]);
        let source = lib.load_source("main").unwrap();
        assert!(source.starts_with(lib.preamble()));
        assert_eq!(source.matches("const BASE").count(), 1);

        let base = source.find("const BASE").unwrap();
        let a = source.find("fn a()").unwrap();
        let b = source.find("fn b()").unwrap();
        let main = source.find("fn main_fn()").unwrap();
        assert!(base < a && a < b && b < main);
    }

    #[test]
    fn test_include_cycle_is_rejected() {
        let (_dir, lib) = library(&[
            ("main", "#include \"a\"\n"),
            ("a", "#include \"b\"\n"),
            ("b", "#include \"a\"\n"),
        ]);
        match lib.load_source("main") {
            Err(Error::ShaderCompile { diagnostic, .. }) => {
                assert!(diagnostic.contains("main -> a -> b -> a"), "{diagnostic}");
            }
            other => panic!("expected cycle error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_missing_include() {
        let (dir, lib) = library(&[("main", "#include \"nowhere\"\n")]);
        match lib.load_source("main") {
            Err(Error::ShaderNotFound { name, path }) => {
                assert_eq!(name, "nowhere");
                assert_eq!(path, dir.path().join("nowhere.wgsl"));
            }
            other => panic!("expected missing shader, got {:?}", other.map(|_| ())),
        }
        assert!(matches!(lib.load_source("absent"), Err(Error::ShaderNotFound { .. })));
    }

    #[test]
    fn test_malformed_include() {
        let (_dir, lib) = library(&[("main", "#include common\n")]);
        assert!(matches!(lib.load_source("main"), Err(Error::ShaderCompile { .. })));
    }

    #[test]
    fn test_compile_error_has_diagnostic() {
        let (_dir, lib) = library(&[("broken", "fn main( {\n")]);
        match lib.compile("broken") {
            Err(Error::ShaderCompile { name, diagnostic }) => {
                assert_eq!(name, "broken");
                assert!(!diagnostic.is_empty());
            }
            other => panic!("expected compile error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_bundled_shaders_validate() {
        for size in [16, 32] {
            let grid = GridConfig::with_chunk_size(size);
            let lib = ShaderLibrary::bundled(&grid);

            let light = lib.compile("light_update").unwrap();
            light.expect_workgroup_size("main", [grid.workgroup_size; 3]).unwrap();

            let raymarch = lib.compile("raymarch").unwrap();
            raymarch.entry_point("vs_main", naga::ShaderStage::Vertex).unwrap();
            raymarch.entry_point("fs_main", naga::ShaderStage::Fragment).unwrap();
        }
    }

    #[test]
    fn test_light_update_needs_no_optional_capabilities() {
        let lib = ShaderLibrary::bundled(&GridConfig::default());
        let light = lib.compile("light_update").unwrap();
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::empty(),
        )
        .validate(&light.module)
        .unwrap();
    }

    #[test]
    fn test_bundled_structs_match_host_layout() {
        let lib = ShaderLibrary::bundled(&GridConfig::default());
        let light = lib.compile("light_update").unwrap();
        let raymarch = lib.compile("raymarch").unwrap();
        for program in [&light, &raymarch] {
            program
                .expect_struct_layout("Voxel", size_of::<Voxel>(), &Voxel::GPU_MEMBERS)
                .unwrap();
        }
        light
            .expect_struct_layout("LightParams", size_of::<LightParams>(), &LightParams::GPU_MEMBERS)
            .unwrap();
        raymarch
            .expect_struct_layout("CameraUniform", size_of::<CameraUniform>(), &CameraUniform::GPU_MEMBERS)
            .unwrap();
    }

    #[test]
    fn test_reordered_struct_is_rejected() {
        let program = |fields: &str| {
            format!(
                "struct Voxel {{\n{fields}\n}}\n\
                 @group(0) @binding(0) var<storage, read> voxels: array<Voxel>;\n\
                 @compute @workgroup_size(1) fn main() {{ _ = voxels[0].flags; }}\n"
            )
        };
        let ordered =
            program("emission: vec3<f32>, diffuse: vec3<f32>, color: array<vec3<f32>, 2>, flags: u32,");
        let reordered =
            program("emission: vec3<f32>, diffuse: vec3<f32>, flags: u32, color: array<vec3<f32>, 2>,");
        let (_dir, lib) = library(&[("ordered", ordered.as_str()), ("reordered", reordered.as_str())]);

        lib.compile("ordered")
            .unwrap()
            .expect_struct_layout("Voxel", size_of::<Voxel>(), &Voxel::GPU_MEMBERS)
            .unwrap();

        let reordered = lib.compile("reordered").unwrap();
        match reordered.expect_struct_layout("Voxel", size_of::<Voxel>(), &Voxel::GPU_MEMBERS) {
            Err(Error::Layout(reason)) => assert!(reason.contains("flags"), "{reason}"),
            other => panic!("expected layout error, got {other:?}"),
        }
        assert!(matches!(
            reordered.expect_struct_layout("Missing", 16, &[]),
            Err(Error::Layout(_))
        ));
    }

    #[test]
    fn test_link_errors() {
        let lib = ShaderLibrary::bundled(&GridConfig::default());
        let light = lib.compile("light_update").unwrap();
        assert!(matches!(
            light.expect_workgroup_size("main", [8, 8, 8]),
            Err(Error::ShaderLink { .. })
        ));
        assert!(matches!(
            light.entry_point("main", naga::ShaderStage::Fragment),
            Err(Error::ShaderLink { .. })
        ));
        assert!(matches!(
            light.entry_point("missing", naga::ShaderStage::Compute),
            Err(Error::ShaderLink { .. })
        ));
    }
}
