//! User-facing message catalog.

/// Supported catalog languages. Unknown locale tags fall back to English.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Es,
}

/// Keys of all translatable prompts and notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    HasLocalSettings,
    NoLocalSettings,
    ProjectName,
    TemplateType,
    Description,
    Version,
    Keywords,
    License,
    AuthorName,
    AuthorEmail,
    Website,
    Private,
    ProjectUrl,
    TestPackages,
    CreateRepo,
    UseYarn,
    RemoteUrl,
    IssueTracker,
    GithubUser,
    GithubToken,
    UpdateToken,
}

impl Locale {
    /// Parse a locale tag such as `en`, `es` or `es-MX`.
    pub fn parse(tag: &str) -> Self {
        let lang = tag
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match lang.as_str() {
            "es" => Locale::Es,
            _ => Locale::En,
        }
    }

    pub fn text(self, message: Message) -> &'static str {
        match self {
            Locale::En => english(message),
            Locale::Es => spanish(message),
        }
    }
}

fn english(message: Message) -> &'static str {
    match message {
        Message::HasLocalSettings => "Using local settings file",
        Message::NoLocalSettings => "No local settings file found, using",
        Message::ProjectName => "Project name",
        Message::TemplateType => "Template",
        Message::Description => "Description",
        Message::Version => "Version",
        Message::Keywords => "Keywords (comma separated)",
        Message::License => "License",
        Message::AuthorName => "Author name",
        Message::AuthorEmail => "Author email",
        Message::Website => "Author website",
        Message::Private => "Is the project private?",
        Message::ProjectUrl => "Project homepage",
        Message::TestPackages => "Testing packages",
        Message::CreateRepo => "Create a GitHub repository?",
        Message::UseYarn => "Use yarn instead of npm?",
        Message::RemoteUrl => "Remote repository URL (leave empty for none)",
        Message::IssueTracker => "Issue tracker URL",
        Message::GithubUser => "GitHub user",
        Message::GithubToken => "GitHub token for",
        Message::UpdateToken => "Save these credentials to the settings file?",
    }
}

fn spanish(message: Message) -> &'static str {
    match message {
        Message::HasLocalSettings => "Usando el archivo de configuración local",
        Message::NoLocalSettings => "No hay archivo de configuración local, usando",
        Message::ProjectName => "Nombre del proyecto",
        Message::TemplateType => "Plantilla",
        Message::Description => "Descripción",
        Message::Version => "Versión",
        Message::Keywords => "Palabras clave (separadas por comas)",
        Message::License => "Licencia",
        Message::AuthorName => "Nombre del autor",
        Message::AuthorEmail => "Correo del autor",
        Message::Website => "Sitio web del autor",
        Message::Private => "¿Es un proyecto privado?",
        Message::ProjectUrl => "Página del proyecto",
        Message::TestPackages => "Paquetes de pruebas",
        Message::CreateRepo => "¿Crear un repositorio en GitHub?",
        Message::UseYarn => "¿Usar yarn en lugar de npm?",
        Message::RemoteUrl => "URL del repositorio remoto (vacío si no hay)",
        Message::IssueTracker => "URL del gestor de incidencias",
        Message::GithubUser => "Usuario de GitHub",
        Message::GithubToken => "Token de GitHub para",
        Message::UpdateToken => "¿Guardar estas credenciales en la configuración?",
    }
}
