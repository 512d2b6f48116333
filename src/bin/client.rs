use common::api::FoodInput;
use common::cli::*;
use common::dashboard::Dashboard;
use common::service::HttpFoodService;

type BoxedError = Box<dyn std::error::Error>;

#[derive(Debug)]
enum Action {
    List,
    Add,
    Edit,
    Delete,
    Toggle,
}

#[derive(Debug)]
struct CLIOptions {
    target: String,
    action: Action,
    args: Vec<String>,
}

fn parse_action(action: &str) -> Result<Action, CLIError> {
    match action.to_ascii_lowercase().as_str() {
        "list" => Ok(Action::List),
        "add" => Ok(Action::Add),
        "edit" => Ok(Action::Edit),
        "delete" => Ok(Action::Delete),
        "toggle" => Ok(Action::Toggle),
        other => Err(CLIError::InvalidParameter(other.to_string())),
    }
}

fn parse_cli_args<I>(mut args: I) -> Result<CLIOptions, CLIError>
where
    I: Iterator<Item = String>,
{
    args.next(); // Skip the program name
    let first = args
        .next()
        .ok_or(CLIError::MissingParameter("target or action"))?;

    let (target, action) = match validate_address(&first) {
        Ok(target) => (
            resolve_address(Some(target))?,
            args.next()
                .ok_or(CLIError::MissingParameter("action"))
                .and_then(|action| parse_action(&action))?,
        ),
        Err(_) => (resolve_address(None)?, parse_action(&first)?),
    };

    Ok(CLIOptions {
        target,
        action,
        args: args.collect(),
    })
}

fn print_menu(dashboard: &Dashboard<HttpFoodService>) {
    let foods = dashboard.foods();
    if foods.is_empty() {
        println!("The menu is empty");
    }
    for food in &foods {
        println!("{}", food);
    }
}

fn run(options: CLIOptions) -> Result<(), BoxedError> {
    let dashboard = Dashboard::new(HttpFoodService::new(&options.target, &base_path()));
    dashboard.load()?;

    match options.action {
        Action::List => (),
        Action::Add => {
            dashboard.open_create();
            let form = parse_form(FoodInput::default(), &options.args)?;
            let food = dashboard.create(form)?;
            println!("Added {}", food);
        }
        Action::Edit => {
            let (id, fields) = options
                .args
                .split_first()
                .ok_or(CLIError::MissingParameter("food id"))?;
            let selected = dashboard.begin_edit_by_id(parse_id(id)?)?;
            let form = parse_form(selected.to_input(), fields)?;
            let food = dashboard.update(form)?;
            println!("Updated {}", food);
        }
        Action::Delete => {
            if options.args.is_empty() {
                return Err(CLIError::MissingParameter("food id").into());
            }
            let ids = options
                .args
                .iter()
                .map(|id| parse_id(id))
                .collect::<Result<Vec<_>, _>>()?;
            for id in ids {
                match dashboard.delete(id)? {
                    Some(food) => println!("Deleted {}", food),
                    None => println!("Deleted #{} (was not on the menu)", id),
                }
            }
        }
        Action::Toggle => {
            let id = options
                .args
                .first()
                .ok_or(CLIError::MissingParameter("food id"))?;
            let food = dashboard.toggle_availability(parse_id(id)?)?;
            println!("Updated {}", food);
        }
    }

    print_menu(&dashboard);
    Ok(())
}

fn main() {
    init_logging();

    let result = parse_cli_args(std::env::args())
        .map_err(BoxedError::from)
        .and_then(run);

    if let Err(err) = result {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}
