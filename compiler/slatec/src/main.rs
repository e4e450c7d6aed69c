//! Slate CLI.

use std::path::PathBuf;
use std::process::ExitCode;

use slatec::{init_tracing, Engine, EngineConfig, Map, Mode, Value};

/// Options shared by `render` and `compile`.
#[derive(Debug, Default)]
struct Options {
    template: Option<String>,
    views: Option<PathBuf>,
    cache: Option<PathBuf>,
    modules: Option<PathBuf>,
    module: Option<String>,
    data: Option<PathBuf>,
    production: bool,
}

impl Options {
    fn parse(args: &[String]) -> Result<Self, String> {
        let mut options = Options::default();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            let mut value = |flag: &str| {
                iter.next()
                    .cloned()
                    .ok_or_else(|| format!("missing value for {flag}"))
            };
            match arg.as_str() {
                "--views" => options.views = Some(value("--views")?.into()),
                "--cache" => options.cache = Some(value("--cache")?.into()),
                "--modules" => options.modules = Some(value("--modules")?.into()),
                "--module" => options.module = Some(value("--module")?),
                "--data" => options.data = Some(value("--data")?.into()),
                "--production" => options.production = true,
                flag if flag.starts_with('-') => return Err(format!("unknown option '{flag}'")),
                name if options.template.is_none() => options.template = Some(name.to_string()),
                extra => return Err(format!("unexpected argument '{extra}'")),
            }
        }
        Ok(options)
    }

    fn config(&self) -> Result<EngineConfig, String> {
        let mut config = EngineConfig::from_env().map_err(|e| e.to_string())?;
        if let Some(views) = &self.views {
            config.views_dir.clone_from(views);
        }
        if let Some(cache) = &self.cache {
            config.cache_dir = Some(cache.clone());
        }
        if let Some(modules) = &self.modules {
            config.modules_dir = Some(modules.clone());
        }
        if let Some(module) = &self.module {
            config.module = Some(module.clone());
        }
        if self.production {
            config.mode = Mode::Production;
        }
        Ok(config)
    }

    fn load_data(&self) -> Result<Option<Map>, String> {
        let Some(path) = &self.data else {
            return Ok(None);
        };
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
        let json: serde_json::Value = serde_json::from_str(&text)
            .map_err(|e| format!("invalid JSON in {}: {e}", path.display()))?;
        match Value::from(json) {
            Value::Map(map) => Ok(Some(map.as_ref().clone())),
            other => Err(format!(
                "{} must contain a JSON object, found {}",
                path.display(),
                other.type_name()
            )),
        }
    }
}

fn main() -> ExitCode {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        return ExitCode::FAILURE;
    }

    let result = match args[1].as_str() {
        "render" => render(&args[2..]),
        "compile" => compile(&args[2..]),
        "passes" => {
            list_passes();
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => Err(format!("unknown command '{other}'")),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn render(args: &[String]) -> Result<(), String> {
    let options = Options::parse(args)?;
    let Some(template) = &options.template else {
        return Err("missing template name\nUsage: slate render <template> [options]".to_string());
    };
    let data = options.load_data()?;
    let engine = Engine::new(options.config()?).map_err(|e| e.to_string())?;
    engine
        .render(template, data.as_ref(), false)
        .map_err(|e| e.to_string())?;
    Ok(())
}

fn compile(args: &[String]) -> Result<(), String> {
    let options = Options::parse(args)?;
    let Some(template) = &options.template else {
        return Err("missing template name\nUsage: slate compile <template> [options]".to_string());
    };
    let engine = Engine::new(options.config()?).map_err(|e| e.to_string())?;
    let compiled = engine.compile(template).map_err(|e| e.to_string())?;
    print!("{compiled}");
    Ok(())
}

fn list_passes() {
    for (i, name) in slate_compile::PassManager::standard().pass_names().iter().enumerate() {
        println!("{:>2}. {name}", i + 1);
    }
}

fn print_usage() {
    println!("Slate template engine");
    println!();
    println!("Usage: slate <command> [options]");
    println!();
    println!("Commands:");
    println!("  render <template>    Render a template to stdout");
    println!("  compile <template>   Print a template's compiled text");
    println!("  passes               List the compiler passes in order");
    println!();
    println!("Options:");
    println!("  --views <dir>        Template directory (default: $SLATE_VIEWS or ./views)");
    println!("  --cache <dir>        Compiled template cache directory");
    println!("  --modules <dir>      Module root directory");
    println!("  --module <name>      Search <modules>/<name>/views first");
    println!("  --data <file.json>   Render data (a JSON object)");
    println!("  --production         Serve cached compilations without checking sources");
    println!();
    println!("Environment:");
    println!("  SLATE_VIEWS, SLATE_CACHE_DIR, SLATE_ENV, SLATE_CACHE_TTL, RUST_LOG");
}
