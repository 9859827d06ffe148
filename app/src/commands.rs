//! Command implementations.
//!
//! Generate commands build `/World` (Xform) holding one mesh prim, record
//! the generator parameters as custom layer data and save the layer.

use std::path::{Path, PathBuf};

use primstage_core::layer::detect_format;
use primstage_core::mesh::{
    generate_cone, generate_icosphere_approx, generate_uv_sphere, GeometryBuffer,
    SubdivisionScheme, GENERATED_ORIENTATION,
};
use primstage_core::usda::export_usda;
use primstage_core::{LayerFormat, PrimKind, SceneDocument, SceneError, Value};
use primstage_storage::{FileSystemStorage, StorageError, StorageProvider};

use crate::args::{Command, ConeArgs, IcosphereArgs, OutputArgs, SphereArgs};
use crate::config::Config;
use crate::report::{self, FileInfo};

/// Extension used for generated layers.
pub const LAYER_EXTENSION: &str = "pstage";

/// Errors surfaced to the user by the CLI.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error("{path}: {source}")]
    Storage {
        path: String,
        #[source]
        source: StorageError,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

fn storage_error(path: &Path) -> impl FnOnce(StorageError) -> CliError + '_ {
    move |source| CliError::Storage {
        path: path.display().to_string(),
        source,
    }
}

/// Run one parsed command, returning what should be printed.
pub fn run(command: Command, config: &Config) -> Result<String, CliError> {
    match command {
        Command::Cone(args) => cone(args, config),
        Command::Sphere(args) => sphere(args, config),
        Command::Icosphere(args) => icosphere(args, config),
        Command::Inspect { files } => inspect(files, config),
        Command::ExportUsda { input, output } => export(&input, &output),
    }
}

fn cone(args: ConeArgs, config: &Config) -> Result<String, CliError> {
    let resolution = args.resolution.unwrap_or(config.cone.resolution);
    let height = args.height.unwrap_or(config.cone.height);
    let radius = args.radius.unwrap_or(config.cone.radius);
    let base_cap = args.base_cap || config.cone.base_cap;

    let buffer = generate_cone(resolution, height, radius, base_cap)?;
    let parameters = Value::map([
        ("resolution", Value::from(resolution)),
        ("height", Value::from(height)),
        ("radius", Value::from(radius)),
        ("base_cap", Value::from(base_cap)),
    ]);
    write_shape("Cone", "cone", &buffer, parameters, &args.output, config)
}

fn sphere(args: SphereArgs, config: &Config) -> Result<String, CliError> {
    let resolution = args.resolution.unwrap_or(config.sphere.resolution);
    let radius = args.radius.unwrap_or(config.sphere.radius);

    let buffer = generate_uv_sphere(resolution, radius)?;
    let parameters = Value::map([
        ("resolution", Value::from(resolution)),
        ("radius", Value::from(radius)),
    ]);
    write_shape("Sphere", "uv_sphere", &buffer, parameters, &args.output, config)
}

fn icosphere(args: IcosphereArgs, config: &Config) -> Result<String, CliError> {
    let radius = args.radius.unwrap_or(config.icosphere.radius);
    let subdivision = args.subdivision.unwrap_or(config.icosphere.subdivision);

    let buffer = generate_icosphere_approx(radius, subdivision)?;
    let parameters = Value::map([
        ("radius", Value::from(radius)),
        ("subdivision", Value::from(subdivision)),
    ]);
    write_shape("Icosphere", "icosphere", &buffer, parameters, &args.output, config)
}

/// `/World/<prim_name>` holding `buffer`, with creator/generator/parameters
/// recorded as custom layer data.
pub fn shape_document(
    prim_name: &str,
    generator: &str,
    buffer: &GeometryBuffer,
    parameters: Value,
    creator: &str,
) -> Result<SceneDocument, SceneError> {
    let mut doc = SceneDocument::new();
    doc.define_prim("/World", PrimKind::Xform)?;
    let mesh = doc.define_prim(&format!("/World/{prim_name}"), PrimKind::Mesh)?;
    doc.set_mesh_attributes(mesh, buffer, GENERATED_ORIENTATION, SubdivisionScheme::None)?;
    doc.set_custom_layer_value("creator", creator);
    doc.set_custom_layer_value("generator", generator);
    doc.set_custom_layer_value("parameters", parameters);
    Ok(doc)
}

fn write_shape(
    prim_name: &str,
    generator: &str,
    buffer: &GeometryBuffer,
    parameters: Value,
    output: &OutputArgs,
    config: &Config,
) -> Result<String, CliError> {
    let doc = shape_document(
        prim_name,
        generator,
        buffer,
        parameters,
        &config.metadata.creator,
    )?;

    let format = output_format(output, config)?;
    let path = output.output.clone().unwrap_or_else(|| {
        config
            .output
            .dir
            .join(format!("{}.{LAYER_EXTENSION}", prim_name.to_lowercase()))
    });
    doc.save_as(&path, format)?;

    Ok(report::generated_summary(
        &doc,
        &path.display().to_string(),
        format,
    ))
}

/// `--binary` wins; otherwise the configured format.
pub fn output_format(output: &OutputArgs, config: &Config) -> Result<LayerFormat, CliError> {
    if output.binary {
        return Ok(LayerFormat::Binary);
    }
    match config.output.format.as_str() {
        "text" => Ok(LayerFormat::Text),
        "binary" => Ok(LayerFormat::Binary),
        other => Err(CliError::Config(format!(
            "unknown output format {other:?}, expected \"text\" or \"binary\""
        ))),
    }
}

fn inspect(files: Vec<PathBuf>, config: &Config) -> Result<String, CliError> {
    let files = if files.is_empty() {
        layers_in(&config.output.dir)?
    } else {
        files
    };
    if files.is_empty() {
        log::warn!(
            "No layers found in {}; run a generate command first",
            config.output.dir.display()
        );
    }

    let mut reports = Vec::with_capacity(files.len());
    for file in &files {
        let (storage, name) = FileSystemStorage::for_file(file).map_err(storage_error(file))?;
        let bytes = storage.read(&name).map_err(storage_error(file))?;
        let doc = SceneDocument::from_bytes(&bytes)?;
        let info = FileInfo {
            path: file.display().to_string(),
            size: bytes.len() as u64,
            format: detect_format(&bytes),
        };
        reports.push(report::document_report(&doc, Some(&info)));
    }
    Ok(reports.join("\n"))
}

/// Layer files directly inside `dir`, sorted by name.
fn layers_in(dir: &Path) -> Result<Vec<PathBuf>, CliError> {
    let storage = FileSystemStorage::new(dir);
    let mut files = Vec::new();
    for name in storage.list_dir("").map_err(storage_error(dir))? {
        let is_layer = Path::new(&name)
            .extension()
            .is_some_and(|ext| ext == LAYER_EXTENSION);
        if is_layer && storage.exists(&name).map_err(storage_error(dir))? {
            files.push(dir.join(name));
        }
    }
    Ok(files)
}

fn export(input: &Path, output: &Path) -> Result<String, CliError> {
    let doc = SceneDocument::open(input)?;
    let text = export_usda(&doc);
    let (storage, name) = FileSystemStorage::for_file(output).map_err(storage_error(output))?;
    storage
        .write(&name, text.as_bytes())
        .map_err(storage_error(output))?;
    Ok(format!(
        "Exported {} to {} ({} prims)\n",
        input.display(),
        output.display(),
        doc.prim_count()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("primstage_app_test_{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn config_in(dir: &Path) -> Config {
        let mut config = Config::default();
        config.output.dir = dir.to_path_buf();
        config.metadata.creator = "tester".into();
        config
    }

    #[test]
    fn cone_command_writes_layer_with_metadata() {
        let dir = temp_dir("cone");
        let config = config_in(&dir);

        let out = run(Command::Cone(ConeArgs::default()), &config).unwrap();
        assert!(out.contains("Vertices: 13"), "{out}");

        let doc = SceneDocument::open(dir.join("cone.pstage")).unwrap();
        let cone = doc.prim_at_path("/World/Cone").unwrap();
        assert_eq!(doc.mesh_geometry(cone).unwrap().face_count(), 12);
        let data = doc.custom_layer_data();
        assert_eq!(data["creator"], Value::from("tester"));
        assert_eq!(data["generator"], Value::from("cone"));
        assert_eq!(
            data["parameters"].get("resolution").and_then(Value::as_i64),
            Some(12)
        );

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn flags_override_config() {
        let dir = temp_dir("override");
        let config = config_in(&dir);
        let target = dir.join("nested").join("ball.pstage");

        let args = SphereArgs {
            resolution: Some(5),
            radius: None,
            output: OutputArgs {
                output: Some(target.clone()),
                binary: true,
            },
        };
        run(Command::Sphere(args), &config).unwrap();

        let bytes = std::fs::read(&target).unwrap();
        assert_eq!(detect_format(&bytes), Some(LayerFormat::Binary));
        let doc = SceneDocument::from_bytes(&bytes).unwrap();
        let sphere = doc.prim_at_path("/World/Sphere").unwrap();
        assert_eq!(doc.mesh_geometry(sphere).unwrap().vertex_count(), 30);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn invalid_parameters_are_reported() {
        let dir = temp_dir("invalid");
        let config = config_in(&dir);
        let args = ConeArgs {
            resolution: Some(2),
            ..Default::default()
        };
        let err = run(Command::Cone(args), &config).unwrap_err();
        assert!(matches!(
            err,
            CliError::Scene(SceneError::InvalidParameter(_))
        ));
        assert!(!dir.join("cone.pstage").exists());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn unknown_output_format_is_a_config_error() {
        let mut config = Config::default();
        config.output.format = "yaml".into();
        assert!(matches!(
            output_format(&OutputArgs::default(), &config),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn inspect_defaults_to_output_dir() {
        let dir = temp_dir("inspect");
        let config = config_in(&dir);
        run(Command::Icosphere(IcosphereArgs::default()), &config).unwrap();
        run(Command::Cone(ConeArgs::default()), &config).unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let out = run(Command::Inspect { files: Vec::new() }, &config).unwrap();
        let cone = out.find("cone.pstage").unwrap();
        let ico = out.find("icosphere.pstage").unwrap();
        assert!(cone < ico);
        assert!(out.contains("Vertices: 12, Faces: 20"));
        assert!(!out.contains("notes.txt"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn export_usda_writes_text() {
        let dir = temp_dir("export");
        let config = config_in(&dir);
        run(Command::Cone(ConeArgs::default()), &config).unwrap();

        let target = dir.join("usd").join("cone.usda");
        run(
            Command::ExportUsda {
                input: dir.join("cone.pstage"),
                output: target.clone(),
            },
            &config,
        )
        .unwrap();
        let text = std::fs::read_to_string(&target).unwrap();
        assert!(text.starts_with("#usda 1.0\n"));
        assert!(text.contains("def Mesh \"Cone\""));

        // Re-exporting replaces the file and leaves no temporaries behind.
        run(
            Command::ExportUsda {
                input: dir.join("cone.pstage"),
                output: target.clone(),
            },
            &config,
        )
        .unwrap();
        let entries: Vec<_> = std::fs::read_dir(dir.join("usd"))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("cone.usda")]);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_layer_reports_its_path() {
        let dir = temp_dir("missing_layer");
        let config = config_in(&dir);
        let missing = dir.join("absent.pstage");

        let err = run(Command::Inspect { files: vec![missing.clone()] }, &config).unwrap_err();
        match err {
            CliError::Storage { path, source } => {
                assert_eq!(path, missing.display().to_string());
                assert!(matches!(source, StorageError::NotFound { .. }));
            }
            other => panic!("expected storage error, got {other:?}"),
        }

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn inspect_of_missing_output_dir_is_empty() {
        let mut config = Config::default();
        config.output.dir = std::env::temp_dir().join("primstage_app_test_never_created");
        assert_eq!(run(Command::Inspect { files: Vec::new() }, &config).unwrap(), "");
    }
}
