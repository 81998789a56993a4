// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Subcommands of the `curapets` binary.

use clap::{Args, Parser, Subcommand};
use curapets::error::{ClientError, Result};
use curapets::models::{
    ApplicationForm, AppointmentStatus, BookingForm, DoctorProfile, FieldErrors, LocalFile,
    LoginForm, PetForm, ProfileForm, Role, SignupForm, Species, Weekday,
};
use curapets::navigation::{nav_items, Route};
use curapets::notices::Notice;
use curapets::services::session::token_expiry;
use curapets::services::{AuthSession, Mount, NotificationStream};
use curapets::time_utils::{format_unix, today_local};
use curapets::App;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "curapets")]
#[command(version, about = "CuraPets veterinary booking client", long_about = None)]
pub struct Cli {
    /// Backend origin (overrides CURAPETS_API_BASE_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and store the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "CURAPETS_PASSWORD", hide_env_values = true)]
        password: String,
        /// Keep the session across restarts
        #[arg(long)]
        remember: bool,
    },
    /// Create an account
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        firstname: String,
        #[arg(long)]
        lastname: String,
        #[arg(long, env = "CURAPETS_PASSWORD", hide_env_values = true)]
        password: String,
        /// `user` (pet owner) or `doctor`
        #[arg(long, default_value = "user")]
        role: Role,
        #[arg(long)]
        accept_terms: bool,
    },
    /// Forget the stored session
    Logout,
    /// Show the current user and their menu
    Whoami,
    #[command(subcommand)]
    Pets(PetsCommand),
    /// List doctors
    Doctors,
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Apply to become a doctor
    Apply {
        #[arg(long)]
        bio: String,
        #[arg(long)]
        specialization: String,
        /// Certificate files (PDF, JPG or PNG, up to 5)
        #[arg(long = "certificate", required = true)]
        certificates: Vec<PathBuf>,
    },
    /// Show the status of your doctor application
    ApplicationStatus,
    #[command(subcommand)]
    Appointments(AppointmentsCommand),
    #[command(subcommand)]
    Notifications(NotificationsCommand),
}

#[derive(Subcommand, Debug)]
pub enum PetsCommand {
    List,
    Show { id: u64 },
    Add(PetArgs),
    Update {
        id: u64,
        #[command(flatten)]
        pet: PetArgs,
    },
}

#[derive(Args, Debug)]
pub struct PetArgs {
    #[arg(long)]
    name: String,
    /// dog, cat, bird or other
    #[arg(long)]
    species: Species,
    #[arg(long)]
    breed: String,
    #[arg(long)]
    age: u32,
    #[arg(long)]
    photo: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    Show,
    /// Edit the doctor profile; unspecified fields keep their values
    Edit {
        #[arg(long)]
        bio: Option<String>,
        #[arg(long)]
        specialization: Option<String>,
        #[arg(long)]
        years_experience: Option<u32>,
        #[arg(long)]
        address: Option<String>,
        /// Available day and hours, e.g. `Monday=09:00-17:00`
        #[arg(long = "day")]
        days: Vec<String>,
        /// Day to remove from availability
        #[arg(long = "off")]
        off: Vec<Weekday>,
    },
}

#[derive(Subcommand, Debug)]
pub enum AppointmentsCommand {
    List {
        #[arg(long, conflicts_with_all = ["today", "requests"])]
        upcoming: bool,
        #[arg(long, conflicts_with = "requests")]
        today: bool,
        #[arg(long)]
        requests: bool,
    },
    Show { id: u64 },
    Book {
        #[arg(long)]
        doctor: u64,
        #[arg(long)]
        pet: Option<u64>,
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long)]
        reason: String,
        /// YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// HH:MM
        #[arg(long)]
        time: String,
    },
    /// Accept, reject or complete a request
    Status { id: u64, status: AppointmentStatus },
    Cancel { id: u64 },
}

#[derive(Subcommand, Debug)]
pub enum NotificationsCommand {
    List,
    /// Print notifications as they arrive
    Listen,
    Read { id: u64 },
    ReadAll,
}

pub async fn run(app: &App, command: Command) -> Result<()> {
    match command {
        Command::Login {
            email,
            password,
            remember,
        } => {
            let outcome = app
                .auth
                .login(&LoginForm::new(&email, &password, remember))
                .await?;
            if let Some(role) = outcome.role {
                println!("Logged in as {}", role.as_str());
            }
            Ok(())
        }
        Command::Signup {
            email,
            firstname,
            lastname,
            password,
            role,
            accept_terms,
        } => {
            let form = SignupForm::new(&email, &firstname, &lastname, &password, role, accept_terms);
            app.auth.signup(&form).await
        }
        Command::Logout => app.auth.logout(),
        Command::Whoami => {
            let session = open(app, Route::Home).await?;
            let user = session.user();
            println!("{} <{}> ({})", user.full_name(), user.email, user.role.as_str());
            if let Some(expires) = token_expiry(session.token()).and_then(format_unix) {
                println!("Session valid until {}", expires);
            }
            for item in nav_items(user.role) {
                println!("  {:<22} {}", item.label, item.route.path());
            }
            Ok(())
        }
        Command::Pets(cmd) => pets(app, cmd).await,
        Command::Doctors => {
            let session = open(app, Route::Home).await?;
            let doctors = session.guard(app.api.list_doctor_profiles(session.token()).await)?;
            for profile in &doctors {
                print_doctor(profile);
            }
            Ok(())
        }
        Command::Profile(cmd) => profile(app, cmd).await,
        Command::Apply {
            bio,
            specialization,
            certificates,
        } => {
            let session = open(app, Route::ApplyAsDoctor).await?;

            let mut files = Vec::with_capacity(certificates.len());
            for path in &certificates {
                files.push(read_file(path).await?);
            }

            // Check the text fields before anything is uploaded
            let mut form = ApplicationForm::new(&bio, &specialization);
            let mut errors = form.validate_fields(&app.config.media_host);
            errors.remove("certificates");
            if !errors.is_empty() {
                return Err(ClientError::Validation(errors));
            }

            let uploaded = session.guard(
                app.media
                    .upload_certificates(session.token(), 0, &files)
                    .await,
            )?;
            for certificate in uploaded {
                form.add_certificate(certificate);
            }

            session.guard(app.media.submit_application(session.token(), &form).await)?;
            app.notices
                .push(Notice::success("Application submitted successfully!"));
            Ok(())
        }
        Command::ApplicationStatus => {
            let session = open(app, Route::ApplyAsDoctor).await?;
            let status = session.guard(app.api.application_status(session.token()).await)?;
            println!("Application: {:?}", status.status);
            if let Some(specialization) = status.specialization {
                println!("Specialization: {}", specialization);
            }
            Ok(())
        }
        Command::Appointments(cmd) => appointments(app, cmd).await,
        Command::Notifications(cmd) => notifications(app, cmd).await,
    }
}

/// Resolve the session for this invocation and check the role may open `route`.
async fn open(app: &App, route: Route) -> Result<AuthSession> {
    let mount = Mount::new();
    let session = app.session.session(&mount).await;
    app.session.release(&mount);
    let session = session?;

    if !route.allowed_for(session.role()) {
        return Err(ClientError::Api {
            status: 403,
            message: format!("{} is not available for your account", route.path()),
        });
    }
    Ok(session)
}

async fn pets(app: &App, cmd: PetsCommand) -> Result<()> {
    let session = open(app, Route::Pets).await?;
    let token = session.token();

    match cmd {
        PetsCommand::List => {
            let pets = session.guard(app.api.list_pets(token).await)?;
            for pet in &pets {
                println!(
                    "{:>4}  {:<16} {:<6} {:<16} {} yr",
                    pet.id,
                    pet.name,
                    pet.species.as_str(),
                    pet.breed,
                    pet.age
                );
            }
        }
        PetsCommand::Show { id } => {
            let pet = session.guard(app.api.get_pet(token, id).await)?;
            println!("{} ({}, {})", pet.name, pet.species.as_str(), pet.breed);
            println!("Age: {}", pet.age);
            if let Some(image) = pet.image {
                println!("Photo: {}", image);
            }
        }
        PetsCommand::Add(args) => {
            let form = pet_form(args).await?;
            let pet = session.guard(app.api.create_pet(token, &form).await)?;
            app.notices
                .push(Notice::success(format!("Added {} (id {})", pet.name, pet.id)));
        }
        PetsCommand::Update { id, pet } => {
            let form = pet_form(pet).await?;
            let pet = session.guard(app.api.update_pet(token, id, &form).await)?;
            app.notices
                .push(Notice::success(format!("Updated {}", pet.name)));
        }
    }
    Ok(())
}

async fn pet_form(args: PetArgs) -> Result<PetForm> {
    let mut form = PetForm::new(&args.name, args.species, &args.breed, args.age);
    if let Some(path) = &args.photo {
        form = form.with_photo(read_file(path).await?);
    }

    let errors = form.validate_fields();
    if !errors.is_empty() {
        return Err(ClientError::Validation(errors));
    }
    Ok(form)
}

async fn profile(app: &App, cmd: ProfileCommand) -> Result<()> {
    let session = open(app, Route::Profile).await?;

    match cmd {
        ProfileCommand::Show => {
            let user = session.user();
            println!("{} <{}>", user.full_name(), user.email);
            if session.role() == Role::Doctor {
                let profile = session.guard(app.api.my_doctor_profile(session.token()).await)?;
                print_doctor(&profile);
                if !profile.address.is_empty() {
                    println!("    {}", profile.address);
                }
            }
            Ok(())
        }
        ProfileCommand::Edit {
            bio,
            specialization,
            years_experience,
            address,
            days,
            off,
        } => {
            if session.role() != Role::Doctor {
                return Err(ClientError::Api {
                    status: 403,
                    message: "Only doctors have an editable profile".to_string(),
                });
            }

            let current = session.guard(app.api.my_doctor_profile(session.token()).await)?;
            let mut form = ProfileForm::from_profile(&current);
            if let Some(bio) = bio {
                form.bio = bio;
            }
            if let Some(specialization) = specialization {
                form.specialization = specialization;
            }
            if let Some(years) = years_experience {
                form.years_experience = years;
            }
            if let Some(address) = address {
                form.address = address;
            }

            for day in off {
                if form.availability.is_selected(day) {
                    form.availability.toggle_day(day);
                }
            }
            for raw in &days {
                let (day, from, to) = parse_day_hours(raw)?;
                if !form.availability.is_selected(day) {
                    form.availability.toggle_day(day);
                }
                form.availability
                    .set_range(day, from, to)
                    .map_err(|e| field_error(&day.time_field(), e.to_string()))?;
            }

            let errors = form.validate_fields();
            if !errors.is_empty() {
                return Err(ClientError::Validation(errors));
            }

            session.guard(
                app.api
                    .update_my_doctor_profile(session.token(), &form.to_update())
                    .await,
            )?;
            app.notices
                .push(Notice::success("Profile updated successfully"));
            Ok(())
        }
    }
}

/// Parse `Monday=09:00-17:00`.
fn parse_day_hours(raw: &str) -> Result<(Weekday, &str, &str)> {
    let invalid = || field_error("day", format!("Expected DAY=HH:MM-HH:MM, got '{}'", raw));

    let (day, hours) = raw.split_once('=').ok_or_else(invalid)?;
    let day: Weekday = day.parse().map_err(|_| invalid())?;
    let (from, to) = hours.split_once('-').ok_or_else(invalid)?;
    Ok((day, from.trim(), to.trim()))
}

async fn appointments(app: &App, cmd: AppointmentsCommand) -> Result<()> {
    match cmd {
        AppointmentsCommand::List {
            upcoming,
            today,
            requests,
        } => {
            let route = if today || requests {
                Route::AppointmentRequests
            } else {
                Route::Home
            };
            let session = open(app, route).await?;
            let token = session.token();
            let list = if upcoming {
                app.api.upcoming_appointments(token).await
            } else if today {
                app.api.today_appointments(token).await
            } else if requests {
                app.api.appointment_requests(token).await
            } else {
                app.api.list_appointments(token).await
            };
            for appt in session.guard(list)? {
                let who = match session.role() {
                    Role::Doctor => appt.patient_name.as_deref().or(appt.pet_name.as_deref()),
                    Role::User => appt.doctor_name.as_deref(),
                };
                println!(
                    "{:>4}  {} {:<8} {:<11} {:<24} {}",
                    appt.id,
                    appt.date,
                    appt.time,
                    appt.status.label(),
                    who.unwrap_or("-"),
                    appt.reason
                );
            }
            Ok(())
        }
        AppointmentsCommand::Show { id } => {
            let session = open(app, Route::Home).await?;
            let appt = session.guard(app.api.get_appointment(session.token(), id).await)?;
            println!("{} ({})", appt.title, appt.status.label());
            println!("When: {} {}", appt.date, appt.time);
            if let Some(doctor) = appt.doctor_name {
                println!("Doctor: {}", doctor);
            }
            if let Some(pet) = appt.pet_name {
                println!("Pet: {}", pet);
            }
            println!("Reason: {}", appt.reason);
            Ok(())
        }
        AppointmentsCommand::Book {
            doctor,
            pet,
            title,
            reason,
            date,
            time,
        } => {
            let session = open(app, Route::BookAppointment).await?;
            let form = BookingForm::new(doctor, pet, &title, &reason, &date, &time);

            let errors = form.validate_fields(today_local());
            if !errors.is_empty() {
                return Err(ClientError::Validation(errors));
            }

            // Advisory only; the backend decides on conflicts
            let doctors = session.guard(app.api.list_doctor_profiles(session.token()).await)?;
            let doctor_id = doctor.to_string();
            if let Some(profile) = doctors
                .iter()
                .find(|p| p.doctor.as_ref().is_some_and(|d| d.id == doctor_id))
            {
                if let Some(warning) = form.availability_warning(profile) {
                    app.notices.push(Notice::info(warning));
                }
            }

            let appt = session.guard(app.api.book_appointment(session.token(), &form).await)?;
            app.notices.push(Notice::success(format!(
                "Appointment requested for {} {} (id {})",
                appt.date, appt.time, appt.id
            )));
            Ok(())
        }
        AppointmentsCommand::Status { id, status } => {
            let session = open(app, Route::AppointmentRequests).await?;
            let appt = session.guard(
                app.api
                    .update_appointment_status(session.token(), id, status)
                    .await,
            )?;
            app.notices.push(Notice::success(format!(
                "Appointment {} is now {}",
                appt.id,
                appt.status.label()
            )));
            Ok(())
        }
        AppointmentsCommand::Cancel { id } => {
            let session = open(app, Route::Home).await?;
            session.guard(app.api.cancel_appointment(session.token(), id).await)?;
            app.notices
                .push(Notice::success(format!("Appointment {} cancelled", id)));
            Ok(())
        }
    }
}

async fn notifications(app: &App, cmd: NotificationsCommand) -> Result<()> {
    let session = open(app, Route::Home).await?;
    let token = session.token();

    match cmd {
        NotificationsCommand::List => {
            for n in session.guard(app.api.list_notifications(token).await)? {
                let marker = if n.is_read { " " } else { "*" };
                println!(
                    "{} {:>4}  {}  {}",
                    marker,
                    n.id.map(|id| id.to_string()).unwrap_or_default(),
                    n.timestamp.as_deref().unwrap_or(""),
                    n.summary()
                );
            }
        }
        NotificationsCommand::Listen => {
            let mut stream = session.guard(NotificationStream::connect(&app.config, token).await)?;
            let interrupted = loop {
                tokio::select! {
                    next = stream.next() => match next {
                        Some(Ok(n)) => println!("{}", n.summary()),
                        Some(Err(e)) => return Err(e),
                        None => break false,
                    },
                    _ = tokio::signal::ctrl_c() => break true,
                }
            };
            if interrupted {
                stream.close().await?;
            }
        }
        NotificationsCommand::Read { id } => {
            session.guard(app.api.mark_notification_read(token, id).await)?;
        }
        NotificationsCommand::ReadAll => {
            session.guard(app.api.mark_all_notifications_read(token).await)?;
            app.notices
                .push(Notice::success("All notifications marked as read"));
        }
    }
    Ok(())
}

fn print_doctor(profile: &DoctorProfile) {
    let availability = profile.availability();
    let days = availability
        .selected_days()
        .map(|day| match availability.range(day) {
            Some(slot) => format!("{} {}-{}", day, slot.from, slot.to),
            None => day.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ");

    println!(
        "{:<24} {:<14} {:>2} yrs  {}",
        profile.display_name(),
        profile.specialization,
        profile.years_experience,
        days
    );
}

async fn read_file(path: &Path) -> Result<LocalFile> {
    LocalFile::read(path)
        .await
        .map_err(|e| field_error("file", format!("{}: {}", path.display(), e)))
}

fn field_error(field: &str, message: String) -> ClientError {
    ClientError::Validation(FieldErrors::from([(field.to_string(), message)]))
}
