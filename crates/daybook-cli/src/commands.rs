//! Command parsing and execution.

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use daybook_core::api::{ApiClient, ApiError};
use daybook_core::models::auth::normalize_email;
use daybook_core::models::{
    ExpenseInput, NoteInput, NoteQuery, NoteStatus, Registration, TaskInput,
};
use daybook_core::utils::{format_date, format_optional, truncate_string};
use daybook_core::Config;
use serde_json::Value;

pub const USAGE: &str = "\
Usage: daybook <command> [args]

Session:
  login [email]                  Sign in (password is prompted)
  register <name> <email>        Create an account and sign in
  logout                         End the session
  status                         Show whether a session is active

Tasks:
  tasks                          List tasks
  task-add <title>               Create a task
  task-done <id>                 Mark a task completed
  task-rm <id>                   Delete a task

Expenses:
  expenses                       List expenses
  expense-add <title> <amount> [category]
                                 Record an expense dated now

Notes:
  notes [--archived] [--search q] [--page n]
                                 List notes
  note-add <title> <content>     Create a note
  note-pin <id>                  Pin a note
  note-archive <id>              Archive a note

  summary                        Tasks, spending and notes at a glance

Environment:
  DAYBOOK_API_URL                Override the API base URL
  RUST_LOG                       Log filter (default: warn)";

/// Category used when `expense-add` is given none
const DEFAULT_EXPENSE_CATEGORY: &str = "other";

/// Title column width in listings
const TITLE_WIDTH: usize = 40;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Login { email: Option<String> },
    Register { name: String, email: String },
    Logout,
    Status,
    Tasks,
    TaskAdd { title: String },
    TaskDone { id: i64 },
    TaskRm { id: i64 },
    Expenses,
    ExpenseAdd {
        title: String,
        amount: f64,
        category: Option<String>,
    },
    Notes(NoteQuery),
    NoteAdd { title: String, content: String },
    NotePin { id: i64 },
    NoteArchive { id: i64 },
    Summary,
}

impl Command {
    pub fn parse(args: &[String]) -> Result<Self> {
        let Some((name, rest)) = args.split_first() else {
            return Ok(Command::Help);
        };

        let command = match name.as_str() {
            "help" | "-h" | "--help" => Command::Help,
            "login" => Command::Login {
                email: rest.first().cloned(),
            },
            "register" => Command::Register {
                name: arg(rest, 0, "name")?,
                email: arg(rest, 1, "email")?,
            },
            "logout" => Command::Logout,
            "status" => Command::Status,
            "tasks" => Command::Tasks,
            "task-add" => Command::TaskAdd {
                title: joined(rest, "title")?,
            },
            "task-done" => Command::TaskDone { id: id_arg(rest)? },
            "task-rm" => Command::TaskRm { id: id_arg(rest)? },
            "expenses" => Command::Expenses,
            "expense-add" => {
                let amount = arg(rest, 1, "amount")?;
                Command::ExpenseAdd {
                    title: arg(rest, 0, "title")?,
                    amount: amount
                        .replace(',', "")
                        .parse::<f64>()
                        .with_context(|| format!("Invalid amount: {}", amount))?,
                    category: rest.get(2).cloned(),
                }
            }
            "notes" => Command::Notes(parse_note_query(rest)?),
            "note-add" => Command::NoteAdd {
                title: arg(rest, 0, "title")?,
                content: arg(rest, 1, "content")?,
            },
            "note-pin" => Command::NotePin { id: id_arg(rest)? },
            "note-archive" => Command::NoteArchive { id: id_arg(rest)? },
            "summary" => Command::Summary,
            other => bail!("Unknown command: {}", other),
        };
        Ok(command)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Help => "help",
            Command::Login { .. } => "login",
            Command::Register { .. } => "register",
            Command::Logout => "logout",
            Command::Status => "status",
            Command::Tasks => "tasks",
            Command::TaskAdd { .. } => "task-add",
            Command::TaskDone { .. } => "task-done",
            Command::TaskRm { .. } => "task-rm",
            Command::Expenses => "expenses",
            Command::ExpenseAdd { .. } => "expense-add",
            Command::Notes(_) => "notes",
            Command::NoteAdd { .. } => "note-add",
            Command::NotePin { .. } => "note-pin",
            Command::NoteArchive { .. } => "note-archive",
            Command::Summary => "summary",
        }
    }
}

fn arg(rest: &[String], index: usize, what: &str) -> Result<String> {
    rest.get(index)
        .filter(|s| !s.trim().is_empty())
        .cloned()
        .ok_or_else(|| anyhow!("Missing <{}>", what))
}

fn joined(rest: &[String], what: &str) -> Result<String> {
    let text = rest.join(" ");
    if text.trim().is_empty() {
        bail!("Missing <{}>", what);
    }
    Ok(text)
}

fn id_arg(rest: &[String]) -> Result<i64> {
    let raw = arg(rest, 0, "id")?;
    raw.parse::<i64>().with_context(|| format!("Invalid id: {}", raw))
}

fn parse_note_query(rest: &[String]) -> Result<NoteQuery> {
    let mut query = NoteQuery::default();
    let mut iter = rest.iter();
    while let Some(flag) = iter.next() {
        match flag.as_str() {
            "--archived" => query.status = NoteStatus::Archived,
            "--search" => {
                let term = iter.next().ok_or_else(|| anyhow!("--search needs a value"))?;
                query.search = Some(term.clone());
            }
            "--page" => {
                let page = iter.next().ok_or_else(|| anyhow!("--page needs a value"))?;
                query.page = page
                    .parse::<u32>()
                    .ok()
                    .filter(|p| *p > 0)
                    .ok_or_else(|| anyhow!("Invalid page: {}", page))?;
            }
            other => bail!("Unknown option for notes: {}", other),
        }
    }
    Ok(query)
}

// ============================================================================
// Execution
// ============================================================================

pub async fn execute(command: Command, client: &ApiClient, config: &mut Config) -> Result<()> {
    match command {
        Command::Help => println!("{}", USAGE),
        Command::Login { email } => login(client, config, email).await?,
        Command::Register { name, email } => {
            let password = prompt_password("Choose a password: ")?;
            let confirm = prompt_password("Repeat password: ")?;
            if password != confirm {
                bail!("Passwords do not match");
            }
            let registration = Registration::new(&name, &email, &password);
            let response = client.register(&registration).await?;
            remember_email(config, &registration.email);
            match response.name {
                Some(name) => println!("Welcome, {}.", name),
                None => println!("Account created."),
            }
        }
        Command::Logout => {
            client.logout().await?;
            println!("Logged out.");
        }
        Command::Status => status(client)?,
        Command::Tasks => {
            let tasks = client.get_tasks().await?;
            print_tasks(&tasks);
        }
        Command::TaskAdd { title } => {
            let created = client.create_task(&TaskInput::new(&title)).await?;
            println!("Created task {}", describe_id(&created));
        }
        Command::TaskDone { id } => {
            client.update_task_status(id, true).await?;
            println!("Task {} completed.", id);
        }
        Command::TaskRm { id } => {
            if client.delete_task(id).await? {
                println!("Task {} deleted.", id);
            }
        }
        Command::Expenses => {
            let expenses = client.get_expenses().await?;
            print_expenses(&expenses);
        }
        Command::ExpenseAdd {
            title,
            amount,
            category,
        } => {
            let expense = ExpenseInput {
                title,
                amount,
                category: category.unwrap_or_else(|| DEFAULT_EXPENSE_CATEGORY.to_string()),
                expense_date: Utc::now(),
            };
            let created = client.create_expense(&expense).await?;
            println!("Recorded expense {}", describe_id(&created));
        }
        Command::Notes(query) => {
            let page = client.get_notes(&query).await?;
            print_notes(&page.data);
            println!(
                "\nPage {} of {} ({} notes, {})",
                query.page,
                page.total_pages(query.per_page),
                page.total,
                query.status
            );
        }
        Command::NoteAdd { title, content } => {
            let note = NoteInput {
                title,
                content,
                color: None,
            };
            let created = client.create_note(&note).await?;
            println!("Created note {}", describe_id(&created));
        }
        Command::NotePin { id } => {
            client.set_note_pinned(id, true).await?;
            println!("Note {} pinned.", id);
        }
        Command::NoteArchive { id } => {
            client.set_note_archived(id, true).await?;
            println!("Note {} archived.", id);
        }
        Command::Summary => summary(client).await?,
    }
    Ok(())
}

async fn login(client: &ApiClient, config: &mut Config, email: Option<String>) -> Result<()> {
    let email = email
        .or_else(|| config.last_email.clone())
        .ok_or_else(|| anyhow!("Missing <email>"))?;
    let password = prompt_password(&format!("Password for {}: ", email))?;

    let response = client.login(&email, &password).await?;
    remember_email(config, &normalize_email(&email));

    match (response.token.is_some(), response.name) {
        (true, Some(name)) => println!("Logged in as {}.", name),
        (true, None) => println!("Logged in."),
        (false, _) => println!(
            "{}",
            response
                .message
                .unwrap_or_else(|| "The server did not start a session.".to_string())
        ),
    }
    Ok(())
}

fn status(client: &ApiClient) -> Result<()> {
    let tokens = client.tokens();
    match tokens.credential()? {
        Some(credential) if !credential.is_expired_at(tokens.now()) => {
            let minutes = credential.minutes_until_expiry(tokens.now());
            println!(
                "Signed in to {}; session expires in {}h {:02}m.",
                client.base_url(),
                minutes / 60,
                minutes % 60
            );
        }
        Some(_) => println!("Session expired. Run `daybook login` to sign in again."),
        None => println!("Not signed in."),
    }
    Ok(())
}

async fn summary(client: &ApiClient) -> Result<()> {
    // Resolve the session once so a missing or expired one ends in one reset
    if client.tokens().get_valid_token()?.is_none() {
        return Err(ApiError::AuthenticationRequired.into());
    }

    let notes_query = NoteQuery::default();
    let (tasks, dashboard, notes) = futures::join!(
        client.get_tasks(),
        client.get_expense_dashboard(),
        client.get_notes(&notes_query),
    );
    let tasks = tasks?;
    let dashboard = dashboard?;
    let notes = notes?;

    let done = tasks.iter().filter(|t| t.status).count();
    println!("Tasks:    {} open, {} completed", tasks.len() - done, done);
    println!("Spending: {}", dashboard.total_display());
    for category in &dashboard.category_breakdown {
        println!(
            "          {:<20} {}",
            category.category,
            format_optional(&category.formatted_total, "-")
        );
    }
    println!("Notes:    {} active", notes.total);
    Ok(())
}

fn prompt_password(prompt: &str) -> Result<String> {
    rpassword::prompt_password(prompt).context("Failed to read password")
}

fn remember_email(config: &mut Config, email: &str) {
    config.last_email = Some(email.to_string());
    if let Err(e) = config.save() {
        tracing::warn!(error = %e, "Failed to save config");
    }
}

fn describe_id(created: &Value) -> String {
    created
        .get("id")
        .or_else(|| created.get("data").and_then(|d| d.get("id")))
        .map(|id| format!("#{}", id))
        .unwrap_or_else(|| "(no id returned)".to_string())
}

fn print_tasks(tasks: &[daybook_core::models::Task]) {
    if tasks.is_empty() {
        println!("No tasks.");
        return;
    }
    for task in tasks {
        let due = task
            .due_date
            .as_deref()
            .map(format_date)
            .unwrap_or_default();
        println!(
            "{:>5}  [{}]  {:<width$}  {:<12}  {}",
            task.id,
            if task.status { "x" } else { " " },
            truncate_string(&task.title, TITLE_WIDTH),
            format_optional(&task.category, ""),
            due,
            width = TITLE_WIDTH
        );
    }
}

fn print_expenses(expenses: &[daybook_core::models::Expense]) {
    if expenses.is_empty() {
        println!("No expenses.");
        return;
    }
    for expense in expenses {
        println!(
            "{:>5}  {:<width$}  {:>12}  {:<12}  {}",
            expense.id,
            truncate_string(&expense.title, TITLE_WIDTH),
            expense.amount_display(),
            format_optional(&expense.category, ""),
            format_optional(&expense.expense_date, ""),
            width = TITLE_WIDTH
        );
    }
}

fn print_notes(notes: &[daybook_core::models::Note]) {
    if notes.is_empty() {
        println!("No notes.");
        return;
    }
    for note in notes {
        let marker = if note.is_pinned { "*" } else { " " };
        println!(
            "{:>5} {} {:<width$}  {}",
            note.id,
            marker,
            truncate_string(&note.title, TITLE_WIDTH),
            truncate_string(&note.content.replace('\n', " "), TITLE_WIDTH),
            width = TITLE_WIDTH
        );
    }
}
