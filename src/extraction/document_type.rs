//! Document types understood by the service and their extraction rubrics.
//!
//! Each [`DocumentType`] owns a static, ordered table of [`FieldSpec`]s. The
//! table is rendered into the system prompt sent to the model and is also the
//! reference used to report fields the model left out of its answer.

use std::fmt;
use std::str::FromStr;

/// One field the model is asked to extract, with the instruction it receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub field_name: &'static str,
    pub extraction_instruction: &'static str,
}

const fn field(field_name: &'static str, extraction_instruction: &'static str) -> FieldSpec {
    FieldSpec {
        field_name,
        extraction_instruction,
    }
}

/// File format an upload must be in for a given document type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Docx,
    Pdf,
}

impl DocumentFormat {
    pub fn extension(self) -> &'static str {
        match self {
            DocumentFormat::Docx => ".docx",
            DocumentFormat::Pdf => ".pdf",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::Docx => write!(f, "docx"),
            DocumentFormat::Pdf => write!(f, "pdf"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentType {
    /// Poder notarial de representante legal.
    Pnrl,
    /// Acta constitutiva.
    Acta,
    /// Constancia de situación fiscal.
    Csf,
    /// Estado de cuenta bancario.
    Cb,
    /// Identificación oficial.
    Id,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown document type: {0}")]
pub struct UnknownDocumentType(pub String);

const PROMPT_PREAMBLE: &str = "Extrae la informacion del documento en caso de que exista, sino se encuentra aclara que la informacion no es proporcionada en el documento:";

const PROMPT_CLOSING: &str = "Return a JSON object whose keys are exactly the field names listed above.";

impl DocumentType {
    pub const ALL: [DocumentType; 5] = [
        DocumentType::Pnrl,
        DocumentType::Acta,
        DocumentType::Csf,
        DocumentType::Cb,
        DocumentType::Id,
    ];

    pub fn format(self) -> DocumentFormat {
        match self {
            DocumentType::Pnrl | DocumentType::Acta => DocumentFormat::Docx,
            DocumentType::Csf | DocumentType::Cb | DocumentType::Id => DocumentFormat::Pdf,
        }
    }

    pub fn route(self) -> &'static str {
        match self {
            DocumentType::Pnrl => "/process-pnrl/",
            DocumentType::Acta => "/process-acta/",
            DocumentType::Csf => "/process-CSF/",
            DocumentType::Cb => "/process-CB/",
            DocumentType::Id => "/process-ID/",
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            DocumentType::Pnrl => "pnrl",
            DocumentType::Acta => "acta",
            DocumentType::Csf => "csf",
            DocumentType::Cb => "cb",
            DocumentType::Id => "id",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            DocumentType::Pnrl => "power of attorney",
            DocumentType::Acta => "incorporation act",
            DocumentType::Csf => "tax status certificate",
            DocumentType::Cb => "bank account statement",
            DocumentType::Id => "identity document",
        }
    }

    pub fn field_specs(self) -> &'static [FieldSpec] {
        match self {
            DocumentType::Pnrl => PNRL_FIELDS,
            DocumentType::Acta => ACTA_FIELDS,
            DocumentType::Csf => CSF_FIELDS,
            DocumentType::Cb => CB_FIELDS,
            DocumentType::Id => ID_FIELDS,
        }
    }

    pub fn field_names(self) -> impl Iterator<Item = &'static str> {
        self.field_specs().iter().map(|spec| spec.field_name)
    }

    /// Instruction message sent ahead of the document text.
    pub fn system_prompt(self) -> String {
        let mut prompt = String::from(PROMPT_PREAMBLE);
        for spec in self.field_specs() {
            prompt.push('\n');
            prompt.push_str(spec.field_name);
            prompt.push_str(": ");
            prompt.push_str(spec.extraction_instruction);
        }
        prompt.push('\n');
        prompt.push_str(PROMPT_CLOSING);
        prompt
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for DocumentType {
    type Err = UnknownDocumentType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DocumentType::ALL
            .into_iter()
            .find(|kind| kind.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownDocumentType(s.to_string()))
    }
}

static PNRL_FIELDS: &[FieldSpec] = &[
    field(
        "Representante legal",
        "Localiza y captura el nombre completo del representante legal que otorga el poder notarial. Si no se encuentra el nombre, indica que no está disponible.",
    ),
    field(
        "Apoderado",
        "Identifica y extrae el nombre completo de la persona a quien se le otorga el poder para actuar en nombre del representante legal. Si no se proporciona el nombre, señala que no se incluyó.",
    ),
    field(
        "Poderes Otorgados",
        "Busca y registra los detalles específicos sobre los poderes otorgados al apoderado, incluyendo las acciones que está autorizado a realizar en nombre del representante legal. Si no se especifican los poderes, menciona que no se encontró esa información.",
    ),
    field(
        "Fecha de otorgamiento",
        "Localiza y anota la fecha en que se otorgó el poder notarial. Si no se indica una fecha de otorgamiento, aclara que no se proporcionó.",
    ),
    field(
        "Fecha de vigencia",
        "Captura la fecha de inicio y fin de la validez del poder notarial, si se especifican. Si no se mencionan las fechas de vigencia, indica que no se incluyeron.",
    ),
    field(
        "Número de protocolo",
        "Identifica y registra el número de protocolo del poder notarial, si se proporciona. Si no se encuentra el número de protocolo, señala que no se incluyó.",
    ),
    field(
        "Datos notariales",
        "Extrae la información sobre el notario que certificó el poder notarial, incluyendo su nombre completo, número de registro y ubicación de su notaría, si se proporcionan. Si alguno de estos datos falta, indica cuál no se encontró.",
    ),
    field(
        "Firma y sello",
        "Verifica si el poder notarial incluye la firma y sello del notario que lo certificó y menciona las respectivas firmas. Si no se encuentran la firma y sello, menciona que no se incluyeron en el documento proporcionado.",
    ),
];

static ACTA_FIELDS: &[FieldSpec] = &[
    field(
        "Razón social de la empresa",
        "Nombre Completo: Localiza y captura el nombre completo y oficial de la empresa tal como está registrado en el Acta Constitutiva. Si no se encuentra el nombre, indica que no está disponible.",
    ),
    field(
        "Tipo de sociedad",
        "Clasificación: Identifica y extrae el tipo de sociedad constituida (por ejemplo, S.A., S. de R.L., etc.). Si no se especifica el tipo de sociedad, menciona que no se incluyó.",
    ),
    field(
        "Objeto social",
        "Descripción: Busca y registra la descripción detallada de las actividades y propósitos para los cuales fue constituida la empresa. Si no se encuentra el objeto social, señala que no se proporcionó.",
    ),
    field(
        "Capital social",
        "Monto y División: Captura el monto total del capital con el que se constituyó la empresa y la forma en que se divide entre los socios, si se especifica. Si no se menciona el capital social, indica que no se incluyó.",
    ),
    field(
        "Domicilio social",
        "Dirección: Localiza y anota la dirección legal de la empresa, incluyendo calle, número, colonia o urbanización, municipio o alcaldía, estado y país. Si no se proporciona el domicilio social, aclara que no se encontró.",
    ),
    field(
        "Duración de la sociedad",
        "Periodo: Identifica y registra el periodo de tiempo durante el cual la sociedad estará en operación, si es determinado o indefinido. Si no se especifica la duración, señala que no se incluyó.",
    ),
    field(
        "Nombre de los socios fundadores",
        "Identificación de las personas o entidades que participaron en la fundación de la empresa.",
    ),
    field(
        "Representante legal",
        "Designación del representante legal o administrador de la empresa, junto con sus facultades y restricciones.",
    ),
    field(
        "Órganos de gobierno",
        "Descripción de los órganos de gobierno de la empresa, como el Consejo de Administración o la Asamblea de Socios, y sus funciones.",
    ),
    field(
        "Reglas de funcionamiento",
        "Estatutos y reglamentos internos que rigen el funcionamiento y la toma de decisiones dentro de la empresa.",
    ),
    field(
        "Datos notariales",
        "Información sobre el notario que certificó el Acta Constitutiva, incluyendo su nombre completo, número de registro y la ubicación de su notaría.",
    ),
    field(
        "Firma y sello",
        "La firma y sello del notario que certificó el Acta Constitutiva, que garantizan su autenticidad.",
    ),
];

static CSF_FIELDS: &[FieldSpec] = &[
    field(
        "RFC",
        "Localiza y captura el Registro Federal de Contribuyentes tal como aparece en la constancia. Si no se encuentra, indica que no está disponible.",
    ),
    field(
        "CURP",
        "Extrae la Clave Única de Registro de Población del contribuyente, si se trata de persona física. Si no aparece, señala que no se incluyó.",
    ),
    field(
        "Nombre o razón social",
        "Captura el nombre completo de la persona física o la denominación o razón social de la persona moral. Si no se encuentra, indica que no está disponible.",
    ),
    field(
        "Régimen capital",
        "Identifica el régimen de capital de la persona moral (por ejemplo, S.A. de C.V.). Si no se especifica, menciona que no se incluyó.",
    ),
    field(
        "Régimen fiscal",
        "Registra el o los regímenes fiscales en los que está inscrito el contribuyente, con su fecha de inicio si se proporciona. Si no se especifican, menciona que no se encontró esa información.",
    ),
    field(
        "Domicilio fiscal",
        "Localiza y anota el domicilio fiscal completo: código postal, tipo y nombre de vialidad, número exterior e interior, colonia, localidad, municipio o demarcación territorial y entidad federativa. Si no se proporciona, aclara que no se encontró.",
    ),
    field(
        "Fecha de inicio de operaciones",
        "Localiza la fecha en que el contribuyente inició operaciones. Si no se indica, aclara que no se proporcionó.",
    ),
    field(
        "Estatus en el padrón",
        "Identifica el estatus del contribuyente en el padrón (por ejemplo, ACTIVO o SUSPENDIDO). Si no se indica, señala que no se incluyó.",
    ),
    field(
        "Fecha de emisión",
        "Captura el lugar y la fecha de emisión de la constancia. Si no se indica, aclara que no se proporcionó.",
    ),
    field(
        "Actividades económicas",
        "Registra las actividades económicas declaradas con su porcentaje y fechas de inicio y fin, si se proporcionan. Si no se mencionan, indica que no se incluyeron.",
    ),
    field(
        "Obligaciones",
        "Extrae las obligaciones fiscales del contribuyente con su descripción, vencimiento y fecha de inicio, si se proporcionan. Si no se mencionan, indica que no se incluyeron.",
    ),
];

static CB_FIELDS: &[FieldSpec] = &[
    field(
        "Institución bancaria",
        "Identifica el nombre del banco que emite el estado de cuenta. Si no se encuentra, indica que no está disponible.",
    ),
    field(
        "Titular de la cuenta",
        "Captura el nombre completo o razón social del titular de la cuenta. Si no se proporciona, señala que no se incluyó.",
    ),
    field(
        "Número de cuenta",
        "Extrae el número de cuenta tal como aparece en el documento. Si no se encuentra, indica que no está disponible.",
    ),
    field(
        "CLABE interbancaria",
        "Localiza la CLABE de 18 dígitos asociada a la cuenta. Si no se encuentra, señala que no se incluyó.",
    ),
    field(
        "Periodo",
        "Registra la fecha de inicio y fin del periodo que cubre el estado de cuenta. Si no se indica, aclara que no se proporcionó.",
    ),
    field(
        "Saldo inicial",
        "Captura el saldo al inicio del periodo. Si no se menciona, indica que no se incluyó.",
    ),
    field(
        "Saldo final",
        "Captura el saldo al cierre del periodo. Si no se menciona, indica que no se incluyó.",
    ),
    field(
        "Total de depósitos",
        "Registra el monto total de depósitos o abonos del periodo. Si no se menciona, indica que no se incluyó.",
    ),
    field(
        "Total de retiros",
        "Registra el monto total de retiros o cargos del periodo. Si no se menciona, indica que no se incluyó.",
    ),
    field(
        "Domicilio del titular",
        "Localiza y anota la dirección del titular impresa en el estado de cuenta. Si no se proporciona, aclara que no se encontró.",
    ),
    field(
        "Moneda",
        "Identifica la moneda en la que se lleva la cuenta (por ejemplo, MXN o USD). Si no se especifica, menciona que no se incluyó.",
    ),
];

static ID_FIELDS: &[FieldSpec] = &[
    field(
        "Tipo de identificación",
        "Identifica el tipo de documento (por ejemplo, credencial para votar, pasaporte o cédula profesional). Si no se puede determinar, indica que no está disponible.",
    ),
    field(
        "Nombre completo",
        "Captura el nombre o nombres y los apellidos del titular. Si no se encuentra, indica que no está disponible.",
    ),
    field(
        "CURP",
        "Extrae la Clave Única de Registro de Población del titular. Si no aparece, señala que no se incluyó.",
    ),
    field(
        "Clave de elector",
        "Extrae la clave de elector, si el documento es una credencial para votar. Si no aparece, señala que no se incluyó.",
    ),
    field(
        "Fecha de nacimiento",
        "Localiza y anota la fecha de nacimiento del titular. Si no se indica, aclara que no se proporcionó.",
    ),
    field(
        "Sexo",
        "Registra el sexo del titular tal como aparece en el documento. Si no se indica, aclara que no se proporcionó.",
    ),
    field(
        "Domicilio",
        "Captura el domicilio del titular, si se incluye en el documento. Si no se proporciona, aclara que no se encontró.",
    ),
    field(
        "Vigencia",
        "Registra el año o la fecha de expedición y de vencimiento del documento. Si no se menciona, indica que no se incluyó.",
    ),
    field(
        "Nacionalidad",
        "Identifica la nacionalidad del titular, si se indica. Si no se menciona, indica que no se incluyó.",
    ),
    field(
        "Número de documento",
        "Extrae el número de folio, número de pasaporte o identificador del documento. Si no se encuentra, indica que no está disponible.",
    ),
];
