//! Makefile rule emission.
//!
//! Emission runs in two stages. [`RuleEmitter::plan`] validates the whole
//! registry and lays out one [`RuleBlock`] per target, dependencies first;
//! only a complete plan can be rendered, so a configuration error never
//! yields partial output. The plan's `Display` impl renders the Makefile.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;

use crate::builder::context::BuildContext;
use crate::core::{Target, TargetKind, TargetRegistry};
use crate::resolver::{dependency_order, transitive_dependencies, ConfigError};

/// Banner written at the top of every generated script.
pub const BANNER: &str = "# AUTOGENERATED FILE; DO NOT MODIFY (use `makegen` instead)";

/// A fully resolved rule script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleScript {
    pub cflags: Vec<String>,
    pub ldflags: Vec<String>,
    pub default_goal: DefaultGoal,
    /// One block per target, each after every block it references
    pub blocks: Vec<RuleBlock>,
}

/// What a bare `make` does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefaultGoal {
    /// Target the goal depends on, or `None` for everything
    pub target: Option<String>,
    /// Command run once the target is built
    pub run: Option<Vec<String>>,
}

/// Rules for one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleBlock {
    pub name: String,
    pub kind: TargetKind,
    pub artifacts: Vec<PathBuf>,
    pub objects: Vec<PathBuf>,
    pub headers: Vec<PathBuf>,
    /// Own include paths, then those of each dependency in name order
    pub includes: Vec<String>,
    pub libs: Vec<String>,
    /// Transitive dependencies in name order
    pub dependencies: Vec<String>,
    pub compile_rules: Vec<CompileRule>,
    pub artifact_rules: Vec<ArtifactRule>,
}

/// Compile one source into one object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompileRule {
    pub source: PathBuf,
    pub object: PathBuf,
}

/// Link one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactRule {
    pub output: PathBuf,
    /// The target's objects followed by each dependency's, in name order
    pub objects: Vec<PathBuf>,
}

/// Lays out and renders the rules for a registry.
pub struct RuleEmitter<'a> {
    ctx: &'a BuildContext,
}

impl<'a> RuleEmitter<'a> {
    pub fn new(ctx: &'a BuildContext) -> Self {
        RuleEmitter { ctx }
    }

    /// Render the Makefile for every target in `registry`.
    pub fn emit_all(&self, registry: &TargetRegistry) -> Result<String, ConfigError> {
        Ok(self.plan(registry)?.to_string())
    }

    /// Validate `registry` and lay out its rule blocks.
    pub fn plan(&self, registry: &TargetRegistry) -> Result<RuleScript, ConfigError> {
        let order = dependency_order(registry)?;
        check_object_collisions(registry)?;

        let mut blocks = Vec::with_capacity(order.len());
        for target in order {
            blocks.push(self.block(registry, target)?);
        }

        check_name_clashes(&blocks)?;
        let default_goal = self.default_goal(registry)?;

        Ok(RuleScript {
            cflags: self.ctx.cflags.iter().cloned().collect(),
            ldflags: self.ctx.ldflags.clone(),
            default_goal,
            blocks,
        })
    }

    fn block(&self, registry: &TargetRegistry, target: &Target) -> Result<RuleBlock, ConfigError> {
        let deps = transitive_dependencies(registry, target)?;

        let objects: Vec<PathBuf> = target
            .objects()
            .into_iter()
            .map(Path::to_path_buf)
            .collect();

        let mut includes: Vec<String> = Vec::new();
        for include in target
            .includes()
            .iter()
            .chain(deps.values().flat_map(|d| d.includes()))
        {
            if !includes.contains(include) {
                includes.push(include.clone());
            }
        }

        let mut compile_rules: Vec<CompileRule> = target
            .sources()
            .iter()
            .map(|(source, object)| CompileRule {
                source: source.clone(),
                object: object.clone(),
            })
            .collect();
        compile_rules.sort_by(|a, b| a.object.cmp(&b.object));

        let mut link_objects = objects.clone();
        for dep in deps.values() {
            link_objects.extend(dep.objects().into_iter().map(Path::to_path_buf));
        }

        let artifacts: Vec<PathBuf> = target
            .artifacts()
            .iter()
            .map(|a| self.ctx.artifact_path(a))
            .collect();
        let artifact_rules = artifacts
            .iter()
            .map(|output| ArtifactRule {
                output: output.clone(),
                objects: link_objects.clone(),
            })
            .collect();

        tracing::debug!(
            "target `{}`: {} object(s), {} dependenc(ies)",
            target.name(),
            objects.len(),
            deps.len()
        );

        Ok(RuleBlock {
            name: target.name().to_string(),
            kind: target.kind(),
            artifacts,
            objects,
            headers: target.headers().iter().cloned().collect(),
            includes,
            libs: target.libs().to_vec(),
            dependencies: deps.keys().map(|k| k.to_string()).collect(),
            compile_rules,
            artifact_rules,
        })
    }

    fn default_goal(&self, registry: &TargetRegistry) -> Result<DefaultGoal, ConfigError> {
        let Some(name) = &self.ctx.default_target else {
            return Ok(DefaultGoal {
                target: None,
                run: None,
            });
        };

        let target = registry.lookup(name)?;
        let run = match (&self.ctx.run_args, target.artifacts().iter().next()) {
            (Some(args), Some(artifact)) => {
                let mut command = vec![run_path(&self.ctx.artifact_path(artifact))];
                command.extend(args.iter().cloned());
                Some(command)
            }
            (Some(_), None) => {
                tracing::warn!(
                    "default target `{}` produces no executable; ignoring run-args",
                    name
                );
                None
            }
            (None, _) => None,
        };

        Ok(DefaultGoal {
            target: Some(name.clone()),
            run,
        })
    }
}

/// Two targets compiling to the same object would emit competing rules.
fn check_object_collisions(registry: &TargetRegistry) -> Result<(), ConfigError> {
    let mut owners: BTreeMap<&Path, (&str, &Path)> = BTreeMap::new();
    for target in registry.iter() {
        for (source, object) in target.sources() {
            let owner = (target.name(), source.as_path());
            if let Some((owner, owner_source)) = owners.insert(object.as_path(), owner) {
                return Err(ConfigError::path_derivation(
                    target.name(),
                    source,
                    format!(
                        "object `{}` is also produced from `{}` by target `{}`",
                        object.display(),
                        owner_source.display(),
                        owner
                    ),
                ));
            }
        }
    }
    Ok(())
}

/// Every target name is also a phony goal, so no file in a rule may share
/// it; make would otherwise see `app: ./app` as a circular dependency.
fn check_name_clashes(blocks: &[RuleBlock]) -> Result<(), ConfigError> {
    let names: BTreeSet<PathBuf> = blocks.iter().map(|b| PathBuf::from(&b.name)).collect();

    for block in blocks {
        let files = block
            .artifacts
            .iter()
            .chain(&block.objects)
            .chain(&block.headers)
            .chain(block.compile_rules.iter().map(|r| &r.source));
        for file in files {
            let normalized: PathBuf = file
                .components()
                .filter(|c| !matches!(c, Component::CurDir))
                .collect();
            if names.contains(&normalized) {
                return Err(ConfigError::path_derivation(
                    &block.name,
                    file,
                    format!("`{}` is also the name of a target", normalized.display()),
                ));
            }
        }
    }
    Ok(())
}

fn run_path(artifact: &Path) -> String {
    let path = make_path(artifact);
    if artifact.is_relative() && !path.starts_with("./") {
        format!("./{}", path)
    } else {
        path
    }
}

/// Render a path as a Make word.
fn make_path(path: &Path) -> String {
    let raw = path.to_string_lossy();
    let raw = if cfg!(windows) {
        raw.replace('\\', "/")
    } else {
        raw.into_owned()
    };

    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            ' ' => out.push_str("\\ "),
            '#' => out.push_str("\\#"),
            '$' => out.push_str("$$"),
            c => out.push(c),
        }
    }
    out
}

/// Space-prefixed list, so an empty list leaves no trailing whitespace.
fn words<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|s| format!(" {}", s.as_ref()))
        .collect()
}

fn path_words<'p>(paths: impl IntoIterator<Item = &'p PathBuf>) -> String {
    words(paths.into_iter().map(|p| make_path(p)))
}

fn var_refs(names: &[String], suffix: &str) -> String {
    words(names.iter().map(|n| format!("$({}_{})", n, suffix)))
}

impl fmt::Display for RuleScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = {
            let mut names: Vec<String> = self.blocks.iter().map(|b| b.name.clone()).collect();
            names.sort();
            names
        };

        writeln!(f, "{}", BANNER)?;
        writeln!(f, "CFLAGS+={}", self.cflags.join(" "))?;
        writeln!(f, "LDFLAGS+={}", self.ldflags.join(" "))?;
        writeln!(f)?;
        writeln!(f, ".PHONY: default all clean{}", words(&names))?;
        writeln!(f)?;

        match &self.default_goal.target {
            Some(target) => writeln!(f, "default: {}", target)?,
            None => writeln!(f, "default: all")?,
        }
        if let Some(run) = &self.default_goal.run {
            writeln!(f, "\t{}", run.join(" "))?;
        }
        writeln!(f)?;

        writeln!(f, "all:{}", words(&names))?;
        writeln!(f)?;

        let artifacts = self.blocks.iter().flat_map(|b| b.artifacts.iter());
        writeln!(f, "clean:")?;
        writeln!(
            f,
            "\trm -f{}{}",
            path_words(artifacts),
            var_refs(&names, "OBJECTS")
        )?;

        for block in &self.blocks {
            write!(f, "{}", block)?;
        }
        Ok(())
    }
}

impl fmt::Display for RuleBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = &self.name;

        writeln!(f)?;
        writeln!(f, "### TARGET: {}", name)?;
        writeln!(f)?;
        if self.artifacts.is_empty() {
            writeln!(f, "{}: $({}_OBJECTS)", name, name)?;
        } else {
            writeln!(f, "{}:{}", name, path_words(&self.artifacts))?;
        }
        writeln!(f)?;

        writeln!(f, "{}_OBJECTS ={}", name, path_words(&self.objects))?;
        writeln!(f, "{}_HEADERS ={}", name, path_words(&self.headers))?;
        writeln!(
            f,
            "{}_INCLUDES ={}",
            name,
            words(self.includes.iter().map(|i| format!("-I{}", i)))
        )?;
        writeln!(f, "{}_LIBS ={}", name, words(&self.libs))?;
        writeln!(f)?;

        let dep_headers = var_refs(&self.dependencies, "HEADERS");
        for rule in &self.compile_rules {
            writeln!(
                f,
                "{}: {} $({}_HEADERS){}",
                make_path(&rule.object),
                make_path(&rule.source),
                name,
                dep_headers
            )?;
            writeln!(f, "\t$(CC) $(CFLAGS) $({}_INCLUDES) $< -c -o $@", name)?;
        }

        let dep_objects = var_refs(&self.dependencies, "OBJECTS");
        let dep_libs = var_refs(&self.dependencies, "LIBS");
        for rule in &self.artifact_rules {
            writeln!(f)?;
            writeln!(
                f,
                "{}: $({}_OBJECTS){}",
                make_path(&rule.output),
                name,
                dep_objects
            )?;
            writeln!(
                f,
                "\t$(CC) $(CFLAGS) $(LDFLAGS) -o $@ $^ $({}_LIBS){}",
                name, dep_libs
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::context::BuildConfig;
    use crate::core::{Manifest, Target};
    use crate::test_support::{lib_and_app, registry_of};

    fn ctx() -> BuildContext {
        let manifest: Manifest = "[project]\nname = \"demo\"\n".parse().unwrap();
        BuildContext::new(&manifest, &BuildConfig::default())
    }

    fn app_path() -> PathBuf {
        PathBuf::from("build").join(format!("app{}", crate::core::target::EXE_EXT))
    }

    #[test]
    fn test_lib_block_precedes_app_block() {
        let ctx = ctx();
        let text = RuleEmitter::new(&ctx).emit_all(&lib_and_app()).unwrap();

        let lib_at = text.find("### TARGET: lib").unwrap();
        let app_at = text.find("### TARGET: app").unwrap();
        assert!(lib_at < app_at);
        assert!(text.contains("lib_OBJECTS = build/obj/a.o\n"));
        assert!(text.contains("app_OBJECTS = build/obj/main.o\n"));
    }

    #[test]
    fn test_app_links_own_and_dependency_objects() {
        let ctx = ctx();
        let script = RuleEmitter::new(&ctx).plan(&lib_and_app()).unwrap();

        let app = script.blocks.iter().find(|b| b.name == "app").unwrap();
        assert_eq!(app.dependencies, ["lib"]);
        assert_eq!(app.artifact_rules.len(), 1);

        let rule = &app.artifact_rules[0];
        assert_eq!(rule.output, app_path());
        assert_eq!(
            rule.objects,
            [
                PathBuf::from("build/obj/main.o"),
                PathBuf::from("build/obj/a.o")
            ]
        );

        let text = script.to_string();
        let link_line = format!(
            "{}: $(app_OBJECTS) $(lib_OBJECTS)\n",
            app_path().display()
        );
        assert!(text.contains(&link_line), "missing `{link_line}` in:\n{text}");
    }

    #[test]
    fn test_library_has_no_artifact_rule() {
        let ctx = ctx();
        let script = RuleEmitter::new(&ctx).plan(&lib_and_app()).unwrap();

        let lib = script.blocks.iter().find(|b| b.name == "lib").unwrap();
        assert!(lib.artifacts.is_empty());
        assert!(lib.artifact_rules.is_empty());
        assert!(script.to_string().contains("lib: $(lib_OBJECTS)\n"));
    }

    #[test]
    fn test_compile_rules() {
        let ctx = ctx();
        let text = RuleEmitter::new(&ctx).emit_all(&lib_and_app()).unwrap();

        assert!(text.contains("build/obj/a.o: a.c $(lib_HEADERS)\n"));
        assert!(text.contains("build/obj/main.o: main.c $(app_HEADERS) $(lib_HEADERS)\n"));
        assert!(text.contains("\t$(CC) $(CFLAGS) $(app_INCLUDES) $< -c -o $@\n"));
    }

    #[test]
    fn test_emission_is_deterministic() {
        let ctx = ctx();
        let emitter = RuleEmitter::new(&ctx);
        let first = emitter.emit_all(&lib_and_app()).unwrap();
        let second = emitter.emit_all(&lib_and_app()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_shared_dependency_emitted_once() {
        let registry = registry_of(&[
            ("app", &["ui", "net"]),
            ("ui", &["core"]),
            ("net", &["core"]),
            ("core", &[]),
        ]);
        let ctx = ctx();
        let text = RuleEmitter::new(&ctx).emit_all(&registry).unwrap();

        assert_eq!(text.matches("### TARGET: core\n").count(), 1);
        let order: Vec<usize> = ["core", "net", "ui", "app"]
            .iter()
            .map(|n| text.find(&format!("### TARGET: {}\n", n)).unwrap())
            .collect();
        assert!(order.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_includes_are_transitive() {
        let mut registry = TargetRegistry::new();
        let mut core = Target::library("core").unwrap();
        core.add_includes(["vendor", "core/include"]);
        registry.register(core).unwrap();
        let mut app = Target::executable("app").unwrap();
        app.add_includes(["src", "vendor"]);
        app.add_dependencies(["core"]);
        registry.register(app).unwrap();

        let ctx = ctx();
        let script = RuleEmitter::new(&ctx).plan(&registry).unwrap();
        let app = script.blocks.iter().find(|b| b.name == "app").unwrap();
        assert_eq!(app.includes, ["src", "vendor", "core/include"]);
        assert!(script
            .to_string()
            .contains("app_INCLUDES = -Isrc -Ivendor -Icore/include\n"));
    }

    #[test]
    fn test_unknown_dependency_fails_before_output() {
        let registry = registry_of(&[("app", &["missing"])]);
        let ctx = ctx();
        let err = RuleEmitter::new(&ctx).emit_all(&registry).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownTarget { ref name, .. } if name == "missing"));
    }

    #[test]
    fn test_cycle_fails_emission() {
        let registry = registry_of(&[("a", &["b"]), ("b", &["a"])]);
        let ctx = ctx();
        assert!(matches!(
            RuleEmitter::new(&ctx).plan(&registry),
            Err(ConfigError::CyclicDependency { .. })
        ));
    }

    #[test]
    fn test_cross_target_object_collision() {
        let mut registry = TargetRegistry::new();
        let mut a = Target::library("a").unwrap();
        a.insert_source("x/util.c", "obj/util.o").unwrap();
        registry.register(a).unwrap();
        let mut b = Target::library("b").unwrap();
        b.insert_source("y/util.c", "obj/util.o").unwrap();
        registry.register(b).unwrap();

        let ctx = ctx();
        assert!(matches!(
            RuleEmitter::new(&ctx).plan(&registry),
            Err(ConfigError::PathDerivation { .. })
        ));
    }

    #[test]
    fn test_header_and_default_goal() {
        let manifest: Manifest = r#"
[project]
name = "demo"
default = "app"
run-args = ["programs/test.coy"]
"#
        .parse()
        .unwrap();
        let ctx = BuildContext::new(&manifest, &BuildConfig::default());
        let text = RuleEmitter::new(&ctx).emit_all(&lib_and_app()).unwrap();

        assert!(text.starts_with(BANNER));
        assert!(text.contains("CFLAGS+=-Og -Wall -g -pedantic -std=c99\n"));
        assert!(text.contains("LDFLAGS+=-static -static-libgcc\n"));
        assert!(text.contains(".PHONY: default all clean app lib\n"));
        assert!(text.contains(&format!(
            "default: app\n\t./{} programs/test.coy\n",
            app_path().display()
        )));
        assert!(text.contains("all: app lib\n"));
        assert!(text.contains("$(app_OBJECTS) $(lib_OBJECTS)\n"));
        // The default goal must be the first rule.
        assert!(text.find("default:").unwrap() < text.find("all:").unwrap());
    }

    #[test]
    fn test_clean_removes_listed_files_only() {
        let ctx = ctx();
        let text = RuleEmitter::new(&ctx).emit_all(&lib_and_app()).unwrap();

        let clean = format!(
            "clean:\n\trm -f {} $(app_OBJECTS) $(lib_OBJECTS)\n",
            make_path(&app_path())
        );
        assert!(text.contains(&clean), "missing `{clean}` in:\n{text}");
        assert!(!text.contains("rm -rf"));
    }

    #[test]
    fn test_unknown_default_target() {
        let manifest: Manifest = "[project]\nname = \"d\"\ndefault = \"nope\"\n".parse().unwrap();
        let ctx = BuildContext::new(&manifest, &BuildConfig::default());
        assert!(matches!(
            RuleEmitter::new(&ctx).plan(&lib_and_app()),
            Err(ConfigError::UnknownTarget { .. })
        ));
    }

    #[test]
    fn test_make_path_escaping() {
        assert_eq!(make_path(Path::new("my dir/a#1.c")), "my\\ dir/a\\#1.c");
        assert_eq!(make_path(Path::new("cost$.c")), "cost$$.c");
        assert_eq!(run_path(Path::new("build/app")), "./build/app");
    }

    fn clash(err: ConfigError) -> (String, PathBuf) {
        match err {
            ConfigError::PathDerivation { target, path, .. } => (target, path),
            other => panic!("expected PathDerivation, got {other:?}"),
        }
    }

    #[cfg(not(windows))]
    #[test]
    fn test_artifact_named_like_target() {
        for build_dir in [".", ""] {
            let manifest: Manifest = format!(
                "[project]\nname = \"d\"\n[build]\nbuild-dir = \"{}\"\nobj-dir = \"obj\"\n",
                build_dir
            )
            .parse()
            .unwrap();
            let ctx = BuildContext::new(&manifest, &BuildConfig::default());

            let err = RuleEmitter::new(&ctx).plan(&lib_and_app()).unwrap_err();
            let (target, path) = clash(err);
            assert_eq!(target, "app");
            assert_eq!(path, Path::new(build_dir).join("app"));
        }
    }

    #[test]
    fn test_object_named_like_target() {
        let mut registry = TargetRegistry::new();
        registry.register(Target::library("util.o").unwrap()).unwrap();
        let mut app = Target::executable("app").unwrap();
        app.insert_source("util.c", "util.o").unwrap();
        registry.register(app).unwrap();

        let ctx = ctx();
        let err = RuleEmitter::new(&ctx).plan(&registry).unwrap_err();
        assert_eq!(clash(err), ("app".to_string(), PathBuf::from("util.o")));
    }

    #[test]
    fn test_source_named_like_target() {
        let mut registry = TargetRegistry::new();
        registry.register(Target::library("gen.c").unwrap()).unwrap();
        let mut app = Target::executable("app").unwrap();
        app.insert_source("./gen.c", "build/obj/gen.o").unwrap();
        registry.register(app).unwrap();

        let ctx = ctx();
        let err = RuleEmitter::new(&ctx).emit_all(&registry).unwrap_err();
        assert_eq!(clash(err), ("app".to_string(), PathBuf::from("./gen.c")));
    }

    #[test]
    fn test_empty_registry() {
        let ctx = ctx();
        let text = RuleEmitter::new(&ctx).emit_all(&TargetRegistry::new()).unwrap();
        assert!(text.contains("default: all\n"));
        assert!(text.contains("all:\n"));
        assert!(!text.contains("### TARGET"));
    }
}
