//! Static template payloads written into scaffolded projects.
//!
//! The engine treats everything here as opaque bytes; nothing validates the
//! generated TypeScript beyond it being the stubs the operations promise.

use serde_json::{Value, json};

pub const ENV_EXAMPLE: &str = r#"# Copy to .env and fill in real values.
DATABASE_URL=postgres://localhost:5432/app
BETTER_AUTH_SECRET=change-me
BETTER_AUTH_URL=http://localhost:3000
STRIPE_SECRET_KEY=sk_test_xxx
STRIPE_WEBHOOK_SECRET=whsec_xxx
NEXT_PUBLIC_STRIPE_PUBLISHABLE_KEY=pk_test_xxx
"#;

pub fn biome_config() -> Value {
    json!({
        "$schema": "https://biomejs.dev/schemas/1.9.4/schema.json",
        "organizeImports": { "enabled": true },
        "formatter": { "enabled": true, "indentStyle": "space", "indentWidth": 2 },
        "linter": {
            "enabled": true,
            "rules": { "recommended": true, "suspicious": { "noExplicitAny": "warn" } }
        },
        "files": { "ignore": ["node_modules", ".next", "dist"] }
    })
}

pub const DRIZZLE_CONFIG: &str = r#"import { defineConfig } from "drizzle-kit";

export default defineConfig({
  schema: "./src/db/schema.ts",
  out: "./drizzle",
  dialect: "postgresql",
  dbCredentials: {
    url: process.env.DATABASE_URL!,
  },
});
"#;

pub const DB_CLIENT: &str = r#"import { drizzle } from "drizzle-orm/node-postgres";
import { Pool } from "pg";
import * as schema from "./schema";

const pool = new Pool({ connectionString: process.env.DATABASE_URL });

export const db = drizzle(pool, { schema });
"#;

pub const DB_SCHEMA: &str = r#"import { pgTable, serial, text, timestamp } from "drizzle-orm/pg-core";

export const users = pgTable("users", {
  id: serial("id").primaryKey(),
  email: text("email").notNull().unique(),
  name: text("name"),
  createdAt: timestamp("created_at").defaultNow().notNull(),
});
"#;

pub const AUTH_SERVER: &str = r#"import { betterAuth } from "better-auth";
import { drizzleAdapter } from "better-auth/adapters/drizzle";
import { db } from "@/db";

export const auth = betterAuth({
  database: drizzleAdapter(db, { provider: "pg" }),
  emailAndPassword: { enabled: true },
  secret: process.env.BETTER_AUTH_SECRET,
  baseURL: process.env.BETTER_AUTH_URL,
});
"#;

pub const AUTH_CLIENT: &str = r#"import { createAuthClient } from "better-auth/react";

export const authClient = createAuthClient({
  baseURL: process.env.NEXT_PUBLIC_APP_URL ?? "http://localhost:3000",
});

export const { signIn, signUp, signOut, useSession } = authClient;
"#;

pub const ORGANIZATION: &str = r#"import { organization } from "better-auth/plugins";

// Wire this plugin into the betterAuth() options in src/lib/auth.ts.
export const organizationPlugin = organization({
  allowUserToCreateOrganization: true,
  organizationLimit: 5,
});
"#;

pub const ORGANIZATION_SCHEMA: &str = r#"import { pgTable, serial, text, timestamp } from "drizzle-orm/pg-core";

export const organizations = pgTable("organizations", {
  id: serial("id").primaryKey(),
  name: text("name").notNull(),
  slug: text("slug").notNull().unique(),
  createdAt: timestamp("created_at").defaultNow().notNull(),
});

export const memberships = pgTable("memberships", {
  id: serial("id").primaryKey(),
  organizationId: serial("organization_id").notNull(),
  userId: serial("user_id").notNull(),
  role: text("role").notNull().default("member"),
});
"#;

pub const INVITATIONS: &str = r#"// Invitation e-mail delivery stub. Replace the console transport with a real
// provider before shipping.
export async function sendInvitation(email: string, organization: string, inviteLink: string) {
  console.info(`invite ${email} to ${organization}: ${inviteLink}`);
}
"#;

pub const STRIPE_CLIENT: &str = r#"import Stripe from "stripe";

export const stripe = new Stripe(process.env.STRIPE_SECRET_KEY!, {
  apiVersion: "2024-06-20",
});
"#;

pub const STRIPE_WEBHOOK_ROUTE: &str = r#"import { headers } from "next/headers";
import { NextResponse } from "next/server";
import { stripe } from "@/lib/stripe";

export async function POST(request: Request) {
  const body = await request.text();
  const signature = (await headers()).get("stripe-signature");
  if (!signature) {
    return NextResponse.json({ error: "missing signature" }, { status: 400 });
  }
  const event = stripe.webhooks.constructEvent(
    body,
    signature,
    process.env.STRIPE_WEBHOOK_SECRET!,
  );
  switch (event.type) {
    case "checkout.session.completed":
      // TODO: fulfil the order once billing entities land in the schema.
      break;
    default:
      break;
  }
  return NextResponse.json({ received: true });
}
"#;

pub const FORM_HELPERS: &str = r#"import { zodResolver } from "@hookform/resolvers/zod";
import { useForm } from "react-hook-form";
import type { z } from "zod";

export function useZodForm<TSchema extends z.ZodType>(schema: TSchema) {
  return useForm<z.infer<TSchema>>({
    resolver: zodResolver(schema),
  });
}
"#;

pub const VITEST_CONFIG: &str = r#"import react from "@vitejs/plugin-react";
import { defineConfig } from "vitest/config";

export default defineConfig({
  plugins: [react()],
  test: {
    environment: "jsdom",
    setupFiles: ["./src/test/setup.ts"],
    globals: true,
  },
});
"#;

pub const VITEST_SETUP: &str = r#"import "@testing-library/jest-dom/vitest";
"#;

pub const SAMPLE_TEST: &str = r#"import { render, screen } from "@testing-library/react";
import { describe, expect, it } from "vitest";

describe("smoke", () => {
  it("renders a heading", () => {
    render(<h1>hello</h1>);
    expect(screen.getByRole("heading")).toBeInTheDocument();
  });
});
"#;

pub const PRE_COMMIT_HOOK: &str = r#"npx lint-staged
"#;

pub const I18N_REQUEST: &str = r#"import { getRequestConfig } from "next-intl/server";

export default getRequestConfig(async () => {
  const locale = "en";
  return {
    locale,
    messages: (await import(`../../messages/${locale}.json`)).default,
  };
});
"#;

pub const I18N_MIDDLEWARE: &str = r#"import createMiddleware from "next-intl/middleware";

export default createMiddleware({
  locales: ["en", "de"],
  defaultLocale: "en",
});

export const config = {
  matcher: ["/((?!api|_next|.*\\..*).*)"],
};
"#;

pub fn messages_en() -> Value {
    json!({
        "home": { "title": "Welcome", "description": "Your app is ready." },
        "nav": { "signIn": "Sign in", "signOut": "Sign out" }
    })
}

pub fn messages_de() -> Value {
    json!({
        "home": { "title": "Willkommen", "description": "Deine App ist bereit." },
        "nav": { "signIn": "Anmelden", "signOut": "Abmelden" }
    })
}
