mod cli;

use cfn_intrinsics::{ResolveContext, Resolver, Template, Value};

fn main() {
    use clap::Parser;
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("CFN_INTRINSICS_LOG"))
        .with_writer(std::io::stderr)
        .init();

    for new_path in cli.directory.iter() {
        match new_path.canonicalize() {
            Err(e) => {
                eprintln!(
                    "Failed to resolve path for -C/--directory {}\n{}",
                    new_path.display(),
                    e
                );
                std::process::exit(1);
            }
            Ok(cwd) => {
                if let Err(err) = std::env::set_current_dir(&cwd) {
                    eprintln!("Failed to set work directory to {}\n{}", cwd.display(), err,);
                    std::process::exit(1);
                }

                tracing::info!(directory=%cwd.display(), "Changed working directory");
            }
        }
    }

    let command_result = match cli.command {
        cli::Command::Expand(expand_cli) => expand(expand_cli),
        cli::Command::Order(order_cli) => order(order_cli),
    };

    if let Err(e) = command_result {
        for error in e.chain() {
            eprintln!("{error}")
        }
        std::process::exit(1);
    }
}

pub fn expand(cli: cli::ExpandCommand) -> anyhow::Result<()> {
    let template = load(&cli.input)?;
    let mut resolver = resolver(&template, &cli.resolve);

    let value = resolver.resolve_template(&template)?;

    output(&cli.output, &value)?;
    Ok(())
}

pub fn order(cli: cli::OrderCommand) -> anyhow::Result<()> {
    let template = load(&cli.input)?;
    let mut resolver = resolver(&template, &cli.resolve);

    resolver.resolve_template(&template)?;

    for logical_id in resolver.dependency_order()? {
        println!("{logical_id}");
    }
    Ok(())
}

fn load(input: &cli::InputArgs) -> anyhow::Result<Template> {
    let Some(file_path) = &input.file else {
        let stdin = std::io::read_to_string(std::io::stdin())?;
        return Ok(stdin.parse()?);
    };

    Ok(Template::load_file(file_path)?)
}

fn resolver(template: &Template, args: &cli::ResolveArgs) -> Resolver {
    let mut ctx = ResolveContext::new(Some(template));
    for (name, value) in &args.parameters {
        if !template.has_parameter(name) {
            tracing::warn!(%name, "parameter is not declared in the template");
        }
        ctx.set_parameter(name.as_str(), value.as_str());
    }

    Resolver::new(ctx)
        .with_logical_id_map(args.renames.iter().cloned())
        .with_placeholders(args.placeholders.iter().cloned())
}

fn output(output: &cli::OutputArgs, value: &Value) -> anyhow::Result<()> {
    match output.format {
        cli::OutputFormat::Yaml => serde_yaml::to_writer(std::io::stdout(), value)?,
        cli::OutputFormat::Json => serde_json::to_writer_pretty(std::io::stdout(), value)?,
    };

    Ok(())
}
