#![cfg(not(tarpaulin_include))]

use chrono::Utc;
use messmass::formula::{self, EvalResult};
use messmass::project::Project;
use messmass::saving;
use std::env;
use std::io::{self, Write};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut project = if args.len() >= 2 {
        let json = std::fs::read_to_string(&args[1])?;
        saving::project_from_json(&json)?
    } else {
        Project::new("untitled", Utc::now().date_naive())
    };

    let mut status = String::from("ok");
    loop {
        print!("({}) > ", status);
        io::stdout().flush().unwrap();

        let mut command = String::new();
        if io::stdin().read_line(&mut command).is_err() {
            break;
        }
        let command = command.trim();

        if command.is_empty() {
            status = String::from("invalid command");
            continue;
        }

        if command == "q" {
            break;
        }

        if command == "help" {
            println!("Commands:");
            println!("  q: Quit");
            println!("  show: Print all stat fields and values");
            println!("  set <field> <value>: Set a stat field");
            println!("  unset <field>: Remove a stat field");
            println!("  eval <formula>: Evaluate a formula, e.g. eval [indoor] + [outdoor]");
            println!("  fields <formula>: List the fields a formula references");
            println!("  save <filename>: Save the project (gzip-compressed binary)");
            continue;
        }

        if command == "show" {
            println!("{} ({})", project.event_name, project.event_date);
            for (field, value) in project.stats.iter() {
                println!("  {} = {}", field, value);
            }
            status = String::from("ok");
            continue;
        }

        let (verb, rest) = match command.split_once(' ') {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (command, ""),
        };

        status = match verb {
            "set" => match rest.split_once(' ') {
                Some((field, value)) => match value.trim().parse::<f64>() {
                    Ok(value) => {
                        project.set_stat(field, value);
                        String::from("ok")
                    }
                    Err(_) => String::from("invalid value"),
                },
                None => String::from("usage: set <field> <value>"),
            },
            "unset" => {
                if rest.is_empty() {
                    String::from("usage: unset <field>")
                } else if project.remove_stat(rest).is_some() {
                    String::from("ok")
                } else {
                    String::from("no such field")
                }
            }
            "eval" => {
                match formula::evaluate(rest, &project.stats) {
                    EvalResult::Number(value) => println!("{}", value),
                    EvalResult::NotApplicable => println!("NA"),
                }
                String::from("ok")
            }
            "fields" => {
                for field in formula::referenced_fields(rest) {
                    let marker = if project.stats.contains(&field) {
                        ""
                    } else {
                        " (missing)"
                    };
                    println!("  {}{}", field, marker);
                }
                String::from("ok")
            }
            "save" => {
                if rest.is_empty() {
                    String::from("usage: save <filename>")
                } else {
                    match saving::save_project(&project, rest) {
                        Ok(_) => String::from("ok"),
                        Err(e) => format!("save failed: {}", e),
                    }
                }
            }
            _ => String::from("invalid command"),
        };
    }

    Ok(())
}
