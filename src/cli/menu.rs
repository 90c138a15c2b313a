//! Numbered-menu shell over the same CRUD tabs the terminal UI uses. Generic
//! over its input and output so tests can drive it with in-memory buffers.

use std::io::{BufRead, Write};

use anyhow::Result;
use rusqlite::Connection;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::analytics::{
    flag_underbilled, predict_top_drugs, top_drugs_report, underbilled_report,
};
use crate::clock::Clock;
use crate::config::Config;
use crate::crud::{clinic_tables, CrudOutcome, CrudTab};
use crate::db::{
    list_doctor_choices, list_patient_choices, list_prescription_choices, reset_schema,
    update_bill_payment, Entity,
};
use crate::error::ClinicError;
use crate::models::{Bill, Choice};
use crate::seed::seed_fixture_data;

/// Whether the menu loop should keep going after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    /// Input ran out.
    Quit,
}

pub struct MenuShell<'a, R, W> {
    conn: &'a Connection,
    config: &'a Config,
    clock: &'a dyn Clock,
    tabs: Vec<CrudTab>,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> MenuShell<'a, R, W> {
    pub fn new(
        conn: &'a Connection,
        config: &'a Config,
        clock: &'a dyn Clock,
        input: R,
        output: W,
    ) -> Self {
        Self {
            conn,
            config,
            clock,
            tabs: clinic_tables().into_iter().map(CrudTab::new).collect(),
            input,
            output,
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Run the main menu until the user picks Exit or input ends.
    pub fn run(&mut self) -> Result<()> {
        loop {
            self.say("")?;
            self.say("🐾 Vet Clinic Manager")?;
            self.say("1. Initialize Database")?;
            self.say("2. Insert Dummy Data")?;
            for (offset, tab) in self.tabs.iter().enumerate() {
                writeln!(self.output, "{}. Manage {}", offset + 3, tab.title())?;
            }
            self.say("9. Analytics")?;
            self.say("0. Exit")?;

            let Some(choice) = self.prompt("Choose: ")? else {
                break;
            };
            let flow = match choice.as_str() {
                "1" => self.initialize()?,
                "2" => self.seed()?,
                "3" | "4" | "5" | "6" | "7" | "8" => {
                    let index = choice.parse::<usize>().unwrap_or(3) - 3;
                    self.manage(index)?
                }
                "9" => self.analytics()?,
                "0" => break,
                _ => {
                    self.say("Invalid option. Try again.")?;
                    Flow::Continue
                }
            };
            if flow == Flow::Quit {
                break;
            }
        }
        self.say("Goodbye! 🐶")?;
        Ok(())
    }

    fn say(&mut self, line: &str) -> Result<()> {
        writeln!(self.output, "{line}")?;
        Ok(())
    }

    fn fail(&mut self, err: &ClinicError) -> Result<()> {
        writeln!(self.output, "❌ {}", err.user_message())?;
        Ok(())
    }

    /// Print `label`, read one line. `None` at end of input.
    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn confirm(&mut self, question: &str) -> Result<Option<bool>> {
        Ok(self
            .prompt(&format!("{question} [y/N]: "))?
            .map(|answer| answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")))
    }

    fn initialize(&mut self) -> Result<Flow> {
        let Some(confirmed) = self.confirm("Drop and recreate all tables? Every record is lost.")?
        else {
            return Ok(Flow::Quit);
        };
        if !confirmed {
            self.say("Cancelled.")?;
            return Ok(Flow::Continue);
        }
        match reset_schema(self.conn) {
            Ok(()) => self.say("✅ Database initialized with all tables.")?,
            Err(err) => self.fail(&err)?,
        }
        Ok(Flow::Continue)
    }

    fn seed(&mut self) -> Result<Flow> {
        match seed_fixture_data(self.conn, &mut rand::rng(), self.clock.today()) {
            Ok(summary) => {
                for line in summary.lines() {
                    self.say(&line)?;
                }
            }
            Err(err) => self.fail(&err)?,
        }
        Ok(Flow::Continue)
    }

    fn manage(&mut self, index: usize) -> Result<Flow> {
        let is_billing = self.tabs[index].entity_name() == <Bill as Entity>::NAME;
        loop {
            writeln!(self.output, "\n--- {} ---", self.tabs[index].title())?;
            self.say("1. Add")?;
            self.say("2. View All")?;
            self.say("3. Edit")?;
            self.say("4. Delete")?;
            if is_billing {
                self.say("5. Update Bill Payment")?;
            }
            self.say("0. Back")?;

            let Some(choice) = self.prompt("Choose: ")? else {
                return Ok(Flow::Quit);
            };
            let flow = match choice.as_str() {
                "1" => self.add_record(index)?,
                "2" => self.view(index)?,
                "3" => self.edit(index)?,
                "4" => self.delete(index)?,
                "5" if is_billing => self.update_payment()?,
                "0" => return Ok(Flow::Continue),
                _ => {
                    self.say("Invalid option.")?;
                    Flow::Continue
                }
            };
            if flow == Flow::Quit {
                return Ok(Flow::Quit);
            }
        }
    }

    fn field_list(&self, index: usize) -> Vec<(&'static str, &'static str)> {
        self.tabs[index]
            .form
            .fields()
            .iter()
            .map(|field| (field.key, field.label))
            .collect()
    }

    /// Reference fields list what they can point at before prompting.
    fn show_choices(&mut self, key: &str) -> Result<()> {
        let choices: crate::error::Result<Vec<Choice>> = match key {
            "patient" => list_patient_choices(self.conn),
            "doctor" => list_doctor_choices(self.conn),
            "prescription_id" => list_prescription_choices(self.conn),
            _ => return Ok(()),
        };
        match choices {
            Ok(choices) if choices.is_empty() => self.say("  (none on file)")?,
            Ok(choices) => {
                for choice in choices {
                    writeln!(self.output, "  {choice}")?;
                }
            }
            Err(err) => self.fail(&err)?,
        }
        Ok(())
    }

    fn label_with_hint(key: &str, label: &str) -> String {
        match key {
            "date" | "billing_date" | "expiry_date" => format!("{label} (YYYY-MM-DD)"),
            "time" => format!("{label} (HH:MM)"),
            "status" => format!("{label} (Scheduled/Completed/Cancelled)"),
            _ => label.to_string(),
        }
    }

    fn add_record(&mut self, index: usize) -> Result<Flow> {
        self.tabs[index].clear_form();
        for (key, label) in self.field_list(index) {
            self.show_choices(key)?;
            let Some(value) = self.prompt(&format!("{}: ", Self::label_with_hint(key, label)))?
            else {
                return Ok(Flow::Quit);
            };
            self.tabs[index].form.set(key, value);
        }

        let today = self.clock.today();
        let tab = &mut self.tabs[index];
        let name = tab.entity_name();
        match tab.add(self.conn, today) {
            Ok(CrudOutcome::Added(id)) => writeln!(self.output, "✅ {name} #{id} added.")?,
            Ok(_) => {}
            Err(err) => self.fail(&err)?,
        }
        Ok(Flow::Continue)
    }

    fn view(&mut self, index: usize) -> Result<Flow> {
        if let Err(err) = self.tabs[index].refresh(self.conn) {
            self.fail(&err)?;
            return Ok(Flow::Continue);
        }
        let tab = &self.tabs[index];
        if tab.rows().is_empty() {
            self.say("No records found.")?;
            return Ok(Flow::Continue);
        }

        let mut builder = Builder::default();
        builder.push_record(tab.columns().iter().map(|column| column.heading));
        for row in tab.rows() {
            builder.push_record(row.cells.iter().map(String::as_str));
        }
        let table = builder.build().with(Style::rounded()).to_string();
        writeln!(self.output, "{table}")?;
        Ok(Flow::Continue)
    }

    /// Load the table and select the row with the id the user types.
    fn pick_row(&mut self, index: usize) -> Result<Option<Option<i64>>> {
        let name = self.tabs[index].entity_name();
        let Some(raw) = self.prompt(&format!("{name} ID: "))? else {
            return Ok(None);
        };
        let Ok(id) = raw.parse::<i64>() else {
            self.fail(&ClinicError::invalid("ID", "ID must be an integer."))?;
            return Ok(Some(None));
        };

        if let Err(err) = self.tabs[index].refresh(self.conn) {
            self.fail(&err)?;
            return Ok(Some(None));
        }
        if !self.tabs[index].select_id(id) {
            self.fail(&ClinicError::NotFound { entity: name, id })?;
            return Ok(Some(None));
        }
        Ok(Some(Some(id)))
    }

    fn edit(&mut self, index: usize) -> Result<Flow> {
        let Some(picked) = self.pick_row(index)? else {
            return Ok(Flow::Quit);
        };
        if picked.is_none() {
            return Ok(Flow::Continue);
        }

        self.say("Press Enter to keep the current value.")?;
        for (key, label) in self.field_list(index) {
            let current = self.tabs[index].form.get(key).to_string();
            self.show_choices(key)?;
            let question = format!("{} [{current}]: ", Self::label_with_hint(key, label));
            let Some(value) = self.prompt(&question)? else {
                return Ok(Flow::Quit);
            };
            if !value.is_empty() {
                self.tabs[index].form.set(key, value);
            }
        }

        let today = self.clock.today();
        let tab = &mut self.tabs[index];
        let name = tab.entity_name();
        match tab.update(self.conn, today) {
            Ok(CrudOutcome::Updated(id)) => writeln!(self.output, "✅ {name} #{id} updated.")?,
            Ok(CrudOutcome::NoSelection) => self.say("ℹ️ Nothing selected.")?,
            Ok(_) => {}
            Err(err) => self.fail(&err)?,
        }
        Ok(Flow::Continue)
    }

    fn delete(&mut self, index: usize) -> Result<Flow> {
        let Some(picked) = self.pick_row(index)? else {
            return Ok(Flow::Quit);
        };
        if picked.is_none() {
            return Ok(Flow::Continue);
        }
        let Some(pending) = self.tabs[index].request_delete() else {
            self.say("ℹ️ Nothing selected.")?;
            return Ok(Flow::Continue);
        };

        let Some(confirmed) = self.confirm(&format!("Delete {}?", pending.summary))? else {
            return Ok(Flow::Quit);
        };
        if !confirmed {
            self.say("Cancelled.")?;
            return Ok(Flow::Continue);
        }

        let tab = &mut self.tabs[index];
        let name = tab.entity_name();
        match tab.confirm_delete(self.conn, &pending) {
            Ok(CrudOutcome::Deleted { id, removed: true }) => {
                writeln!(self.output, "🗑️ {name} #{id} deleted.")?
            }
            Ok(_) => self.say("ℹ️ Nothing deleted.")?,
            Err(err) => self.fail(&err)?,
        }
        Ok(Flow::Continue)
    }

    fn update_payment(&mut self) -> Result<Flow> {
        let Some(raw_id) = self.prompt("Bill ID: ")? else {
            return Ok(Flow::Quit);
        };
        let currency = self.config.currency_symbol.clone();
        let Some(raw_paid) = self.prompt(&format!("Paid Amount ({currency}): "))? else {
            return Ok(Flow::Quit);
        };

        let parsed = match (raw_id.parse::<i64>(), raw_paid.parse::<f64>()) {
            (Ok(id), Ok(paid)) if paid.is_finite() => Ok((id, paid)),
            (Err(_), _) => Err(ClinicError::invalid("Bill ID", "Bill ID must be an integer.")),
            _ => Err(ClinicError::invalid("Paid", "Paid must be a number.")),
        };
        match parsed.and_then(|(id, paid)| update_bill_payment(self.conn, id, paid)) {
            Ok(()) => self.say("💰 Payment updated.")?,
            Err(err) => self.fail(&err)?,
        }
        Ok(Flow::Continue)
    }

    fn analytics(&mut self) -> Result<Flow> {
        let days = self.config.top_drugs_window_days;
        let top_n = self.config.top_drugs_count;
        let threshold = self.config.underbilled_threshold;
        loop {
            self.say("\n--- Analytics ---")?;
            writeln!(self.output, "1. Predict Top Drugs ({days}d)")?;
            writeln!(
                self.output,
                "2. Flag Underbilled (<{}%)",
                (threshold * 100.0).round()
            )?;
            self.say("0. Back")?;

            let Some(choice) = self.prompt("Choose: ")? else {
                return Ok(Flow::Quit);
            };
            let report = match choice.as_str() {
                "1" => predict_top_drugs(self.conn, self.clock.today(), days, top_n)
                    .map(|usage| top_drugs_report(&usage, days)),
                "2" => flag_underbilled(self.conn, threshold).map(|bills| {
                    underbilled_report(&bills, threshold, &self.config.currency_symbol)
                }),
                "0" => return Ok(Flow::Continue),
                _ => {
                    self.say("Invalid option.")?;
                    continue;
                }
            };
            match report {
                Ok(lines) => {
                    for line in lines {
                        self.say(&line)?;
                    }
                }
                Err(err) => self.fail(&err)?,
            }
        }
    }
}
