use std::{
    env, fs,
    io::{self, Read},
    path::PathBuf,
    process::ExitCode,
};

use calc_template::{
    bindings_from_json_str, evaluate_expression, free_expression, parse_expression_with,
    render_all, render_default, replace_variables, ParseMode, TemplateOptions,
};

#[derive(Debug, Default)]
struct RenderOptions {
    inputs: Vec<String>,
    capacity: Option<usize>,
    lenient: bool,
    config: Option<PathBuf>,
    vars: Vec<(String, f64)>,
    var_files: Vec<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    match run(env::args().collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            print_usage();
            ExitCode::FAILURE
        }
    }
}

fn run(args: Vec<String>) -> Result<(), String> {
    if args.len() < 3 {
        return Err("not enough arguments".to_string());
    }

    let command = args[1].as_str();
    match command {
        "render" => {
            let options = parse_render_options(&args[2..])?;
            run_render(options)
        }
        "eval" => {
            let (expression, mode) = parse_eval_options(&args[2..])?;
            run_eval(&expression, mode)
        }
        _ => Err(format!("unknown command '{command}'")),
    }
}

fn run_render(options: RenderOptions) -> Result<(), String> {
    let mut template_options = match &options.config {
        Some(path) => TemplateOptions::from_path(path).map_err(|e| e.to_string())?,
        None => TemplateOptions::default(),
    };
    if let Some(capacity) = options.capacity {
        template_options.capacity = capacity;
    }
    if options.lenient {
        template_options.mode = ParseMode::Lenient;
    }

    let mut bindings = options.vars;
    for path in &options.var_files {
        let raw = fs::read_to_string(path)
            .map_err(|e| format!("failed to read '{}': {e}", path.display()))?;
        bindings.extend(bindings_from_json_str(&raw).map_err(|e| e.to_string())?);
    }

    let mut sources = Vec::with_capacity(options.inputs.len());
    for input in &options.inputs {
        let source = read_source(input)?;
        if bindings.is_empty() {
            sources.push(source);
        } else {
            sources.push(replace_variables(&source, usize::MAX, &bindings));
        }
    }

    let rendered = render_all(&sources, &template_options);
    for (input, result) in options.inputs.iter().zip(&rendered) {
        for issue in &result.issues {
            eprintln!("warning: {input}:{}: {}", issue.offset, issue.error);
        }
        println!("{}", result.text);
    }
    Ok(())
}

fn run_eval(expression: &str, mode: ParseMode) -> Result<(), String> {
    let tree = parse_expression_with(expression, mode).map_err(|e| e.to_string())?;
    let value = evaluate_expression(&tree).map_err(|e| e.to_string())?;
    free_expression(tree);
    println!("{}", render_default(value));
    Ok(())
}

fn read_source(input: &str) -> Result<String, String> {
    if input == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("failed to read stdin: {e}"))?;
        return Ok(buf);
    }
    fs::read_to_string(input).map_err(|e| format!("failed to read '{input}': {e}"))
}

fn parse_render_options(args: &[String]) -> Result<RenderOptions, String> {
    let mut options = RenderOptions::default();
    let mut i = 0usize;

    while i < args.len() {
        match args[i].as_str() {
            "--capacity" => {
                let raw = option_value(args, i, "--capacity")?;
                let capacity = raw
                    .parse::<usize>()
                    .map_err(|_| format!("invalid --capacity value '{raw}'"))?;
                options.capacity = Some(capacity);
                i += 2;
            }
            "--lenient" => {
                options.lenient = true;
                i += 1;
            }
            "--config" => {
                options.config = Some(PathBuf::from(option_value(args, i, "--config")?));
                i += 2;
            }
            "--var" => {
                let raw = option_value(args, i, "--var")?;
                options.vars.push(parse_var(raw)?);
                i += 2;
            }
            "--vars" => {
                options
                    .var_files
                    .push(PathBuf::from(option_value(args, i, "--vars")?));
                i += 2;
            }
            other if other.starts_with("--") => {
                return Err(format!("unknown option '{other}'"));
            }
            other => {
                options.inputs.push(other.to_string());
                i += 1;
            }
        }
    }

    if options.inputs.is_empty() {
        return Err("render requires at least one input file or '-'".to_string());
    }
    Ok(options)
}

fn parse_eval_options(args: &[String]) -> Result<(String, ParseMode), String> {
    let mut expression = None;
    let mut mode = ParseMode::Strict;

    for arg in args {
        match arg.as_str() {
            "--lenient" => mode = ParseMode::Lenient,
            other if expression.is_none() => expression = Some(other.to_string()),
            other => return Err(format!("unexpected argument '{other}'")),
        }
    }

    let expression = expression.ok_or_else(|| "eval requires an expression".to_string())?;
    Ok((expression, mode))
}

fn option_value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str, String> {
    args.get(i + 1)
        .map(String::as_str)
        .ok_or_else(|| format!("{flag} requires a value"))
}

fn parse_var(raw: &str) -> Result<(String, f64), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("invalid --var '{raw}'; expected NAME=VALUE"))?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("invalid value for variable '{name}': '{value}'"))?;
    Ok((name.trim().to_string(), value))
}

fn print_usage() {
    eprintln!(
        "usage:\n  calc-template render <file|->... [--capacity N] [--lenient] [--config options.json] [--var NAME=VALUE]... [--vars bindings.json]\n  calc-template eval <expression> [--lenient]"
    );
}
